//! Task tracker service with a pluggable cache-aside layer
//!
//! Tasks live in a [`TaskRepository`], the source of truth. Reads go through
//! a typed [`CacheStore`] first (in-memory, Redis or no-op, chosen at
//! startup) and fall back to the repository on a miss; writes commit to the
//! repository and then invalidate. A failing cache only costs latency, never
//! correctness.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use task_tracker::{App, AppContext, Config, InMemoryTaskRepository, Task, TaskService, TasksModule};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     task_tracker::init_tracing_with_config(&config);
//!
//!     let store = task_tracker::cache::build_store::<Task>(&config.cache).await?;
//!     let repo = Arc::new(InMemoryTaskRepository::new());
//!     let service = Arc::new(TaskService::new(repo, store));
//!
//!     App::new(config, AppContext::new(service))
//!         .register_module(TasksModule)
//!         .serve()
//!         .await?;
//!     Ok(())
//! }
//! ```

mod app;
pub mod cache;
mod config;
mod core;
mod error;
pub mod health;
mod http;
mod middleware;
pub mod tasks;
pub mod testing;
pub mod traits;
mod utils;
pub mod validation;

pub use app::{AppContext, AppContextBuilder};
pub use cache::{CacheAside, CacheBackend, CacheConfig, CacheError, CacheStatus};
pub use config::{Config, ConfigBuilder, LoggingConfig, ServerConfig};
pub use core::App;
pub use error::{ErrorResponse, Result, TrackerError};
pub use health::{CacheHealthCheck, ComponentHealth, HealthCheck, HealthChecker, HealthStatus};
pub use http::{CreatedResponse, NoContentResponse, RouteModule};
pub use tasks::{InMemoryTaskRepository, Task, TaskService, TaskStatus, TasksModule};
pub use traits::cache::CacheStore;
pub use traits::repository::TaskRepository;
pub use validation::ValidatedJson;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "task_tracker=debug")
/// - `TRACKER_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = std::env::var("TRACKER_LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    install_subscriber(env_filter, json_logs);
}

/// Initialize tracing from the logging section of a [`Config`]
///
/// `RUST_LOG`, when set, still wins over the configured level.
pub fn init_tracing_with_config(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    install_subscriber(env_filter, config.logging.json);
}

fn install_subscriber(env_filter: EnvFilter, json: bool) {
    let registry = tracing_subscriber::registry().with(env_filter);

    // try_init so a second call (tests, embedding) does not panic
    let result = if json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    if let Err(error) = result {
        tracing::debug!(error = %error, "Tracing subscriber already installed");
    }
}
