//! Environment helpers shared by the configuration loaders.

pub mod env;

pub use env::{get_env_with_prefix, parse_env_with_prefix};
