//! Request validation using the `validator` crate.
//!
//! Request DTOs derive [`validator::Validate`]; handlers take them through
//! [`ValidatedJson`] so an invalid body never reaches the service.

mod extractor;

pub use extractor::{ValidatedJson, validate_json, validation_message};
pub use validator;
