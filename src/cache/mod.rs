//! Typed cache stores and the cache-aside coordinator.
//!
//! Three interchangeable backends implement [`CacheStore`]:
//! [`InMemoryCache`] (default), [`RedisCache`] (`cache-redis` feature) and
//! [`NoOpCache`]. Which one runs is decided once at startup by
//! [`build_store`] from [`CacheConfig`]; the resulting store is shared by
//! every request through [`CacheAside`].

mod aside;
mod config;
mod error;
mod in_memory;
mod noop;

#[cfg(feature = "cache-redis")]
mod redis;

pub use aside::{CacheAside, CacheStatus, Fetched, best_effort};
pub use config::{CacheBackend, CacheConfig, RedisSettings};
pub use error::{CacheError, CacheResult};
pub use in_memory::InMemoryCache;
pub use noop::NoOpCache;

#[cfg(feature = "cache-redis")]
pub use self::redis::RedisCache;

use crate::traits::cache::CacheStore;
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;

/// Build the configured cache backend for values of type `T`
///
/// The Redis backend connects and pings here, so an unreachable server fails
/// startup instead of the first request.
pub async fn build_store<T>(config: &CacheConfig) -> CacheResult<Arc<dyn CacheStore<T>>>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    let store: Arc<dyn CacheStore<T>> = match config.backend {
        CacheBackend::Memory => Arc::new(InMemoryCache::new()),
        CacheBackend::NoOp => Arc::new(NoOpCache::new()),
        #[cfg(feature = "cache-redis")]
        CacheBackend::Redis => Arc::new(RedisCache::connect(&config.redis).await?),
    };

    tracing::info!(backend = store.backend(), "Cache store ready");
    Ok(store)
}
