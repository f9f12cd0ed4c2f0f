//! Cache-aside coordination
//!
//! Reads consult the cache first and fall back to the source of truth,
//! filling the cache on the way out. Writes go to the source of truth first
//! and invalidate the cache afterwards. Cache failures never fail a request:
//! a failed read counts as a miss and failed writes or invalidations are
//! logged through [`best_effort`].
//!
//! Two races are accepted rather than engineered away:
//!
//! - Concurrent readers missing on the same key all hit the repository and
//!   all write the cache (no single-flight).
//! - A reader that fetched before a write commits can repopulate the cache
//!   after the writer's invalidation, leaving a stale entry until the next
//!   write or TTL expiry.

use crate::cache::CacheResult;
use crate::traits::cache::CacheStore;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

/// Where a value handed back by the coordinator came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from the cache
    Hit,
    /// Loaded from the source of truth
    Miss,
}

impl CacheStatus {
    /// Value for the `X-Cache-Status` response header
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit)
    }
}

/// A value together with its cache status
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<V> {
    pub value: V,
    pub status: CacheStatus,
}

/// Log and swallow the outcome of a cache write or invalidation.
///
/// Returns whether the operation succeeded. Call sites use this instead of
/// discarding the result so every ignored cache failure is visible in logs.
pub fn best_effort(operation: &'static str, key: &str, result: CacheResult<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(error) => {
            tracing::warn!(
                operation,
                key,
                error = %error,
                "Best-effort cache operation failed; continuing without cache"
            );
            false
        }
    }
}

/// Cache-aside coordinator for one namespace of entities
///
/// Item keys are `"<namespace>:<id>"` and the collection key is the bare
/// namespace, so population on read and invalidation on write always agree.
pub struct CacheAside<T> {
    store: Arc<dyn CacheStore<T>>,
    namespace: String,
}

impl<T> Clone for CacheAside<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            namespace: self.namespace.clone(),
        }
    }
}

impl<T> CacheAside<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(store: Arc<dyn CacheStore<T>>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn store(&self) -> &Arc<dyn CacheStore<T>> {
        &self.store
    }

    pub fn item_key(&self, id: impl Display) -> String {
        format!("{}:{}", self.namespace, id)
    }

    pub fn collection_key(&self) -> &str {
        &self.namespace
    }

    /// Read one entity through the cache.
    ///
    /// On a hit the loader is never called. On a miss, or when the cache
    /// read fails, the loader runs; its error is returned as-is and the cache
    /// is left untouched. A successful load is written back best-effort.
    pub async fn fetch<F, Fut, E>(&self, id: impl Display, load: F) -> Result<Fetched<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = self.item_key(id);

        match self.store.get(&key).await {
            Ok(Some(value)) => {
                tracing::debug!(key = %key, backend = self.store.backend(), "Cache hit");
                return Ok(Fetched {
                    value,
                    status: CacheStatus::Hit,
                });
            }
            Ok(None) => {
                tracing::debug!(key = %key, backend = self.store.backend(), "Cache miss");
            }
            Err(error) => {
                tracing::warn!(
                    key = %key,
                    backend = self.store.backend(),
                    error = %error,
                    "Cache read failed, falling back to repository"
                );
            }
        }

        let value = load().await?;
        best_effort("set", &key, self.store.set(&key, &value).await);

        Ok(Fetched {
            value,
            status: CacheStatus::Miss,
        })
    }

    /// Read the whole ordered collection through the cache.
    ///
    /// Same protocol as [`CacheAside::fetch`], keyed on the namespace.
    pub async fn fetch_all<F, Fut, E>(&self, load: F) -> Result<Fetched<Vec<T>>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
    {
        let key = self.collection_key();

        match self.store.get_all(key).await {
            Ok(Some(values)) => {
                tracing::debug!(key, count = values.len(), "Collection cache hit");
                return Ok(Fetched {
                    value: values,
                    status: CacheStatus::Hit,
                });
            }
            Ok(None) => {
                tracing::debug!(key, "Collection cache miss");
            }
            Err(error) => {
                tracing::warn!(
                    key,
                    error = %error,
                    "Collection cache read failed, falling back to repository"
                );
            }
        }

        let values = load().await?;
        best_effort("set_all", key, self.store.set_all(key, &values).await);

        Ok(Fetched {
            value: values,
            status: CacheStatus::Miss,
        })
    }

    /// Drop the cached entity and the cached collection after a committed
    /// update or delete.
    pub async fn invalidate(&self, id: impl Display) {
        let key = self.item_key(id);
        best_effort("invalidate", &key, self.store.invalidate(&key).await);
        self.invalidate_collection().await;
    }

    /// Drop the cached collection after a committed create.
    pub async fn invalidate_collection(&self) {
        let key = self.collection_key();
        best_effort("invalidate_all", key, self.store.invalidate_all(key).await);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheError, InMemoryCache, NoOpCache};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store whose every operation fails at the transport level
    struct BrokenStore;

    #[async_trait]
    impl CacheStore<String> for BrokenStore {
        async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
            Err(CacheError::transport("GET", "connection refused"))
        }
        async fn set(&self, _key: &str, _value: &String) -> CacheResult<()> {
            Err(CacheError::transport("SET", "connection refused"))
        }
        async fn invalidate(&self, _key: &str) -> CacheResult<()> {
            Err(CacheError::transport("DEL", "connection refused"))
        }
        async fn get_all(&self, _namespace: &str) -> CacheResult<Option<Vec<String>>> {
            Err(CacheError::transport("GET", "connection refused"))
        }
        async fn set_all(&self, _namespace: &str, _values: &[String]) -> CacheResult<()> {
            Err(CacheError::transport("SET", "connection refused"))
        }
        async fn invalidate_all(&self, _namespace: &str) -> CacheResult<()> {
            Err(CacheError::transport("DEL", "connection refused"))
        }
        fn backend(&self) -> &'static str {
            "broken"
        }
    }

    fn aside(store: Arc<dyn CacheStore<String>>) -> CacheAside<String> {
        CacheAside::new(store, "tasks")
    }

    #[test]
    fn test_key_convention() {
        let aside = aside(Arc::new(NoOpCache::<String>::new()));
        assert_eq!(aside.item_key("abc"), "tasks:abc");
        assert_eq!(aside.collection_key(), "tasks");
    }

    #[test]
    fn test_best_effort_reports_outcome() {
        assert!(best_effort("set", "tasks:abc", Ok(())));
        assert!(!best_effort("set", "tasks:abc", Err(CacheError::Closed)));
    }

    #[tokio::test]
    async fn test_miss_loads_once_then_hits() {
        let store = Arc::new(InMemoryCache::<String>::new());
        let aside = aside(store.clone());
        let loads = AtomicUsize::new(0);

        let load = || async {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>("value".to_string())
        };

        let first = aside.fetch("abc", load).await.unwrap();
        assert_eq!(first.status, CacheStatus::Miss);
        assert_eq!(first.value, "value");
        assert_eq!(store.get("tasks:abc").await.unwrap(), Some("value".to_string()));

        let second = aside
            .fetch("abc", || async {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>("other".to_string())
            })
            .await
            .unwrap();
        assert_eq!(second.status, CacheStatus::Hit);
        assert_eq!(second.value, "value");
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_loader_error_propagates_and_cache_untouched() {
        let store = Arc::new(InMemoryCache::<String>::new());
        let aside = aside(store.clone());

        let result = aside
            .fetch("abc", || async { Err::<String, _>("not found") })
            .await;

        assert_eq!(result.unwrap_err(), "not found");
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_broken_cache_falls_through_to_loader() {
        let aside = aside(Arc::new(BrokenStore));

        let fetched = aside
            .fetch("abc", || async { Ok::<_, String>("fresh".to_string()) })
            .await
            .unwrap();
        assert_eq!(fetched.value, "fresh");
        assert_eq!(fetched.status, CacheStatus::Miss);

        let all = aside
            .fetch_all(|| async { Ok::<_, String>(vec!["a".to_string()]) })
            .await
            .unwrap();
        assert_eq!(all.value, vec!["a".to_string()]);

        // Invalidation failures are swallowed.
        aside.invalidate("abc").await;
        aside.invalidate_collection().await;
    }

    #[tokio::test]
    async fn test_invalidate_clears_item_and_collection() {
        let store = Arc::new(InMemoryCache::<String>::new());
        let aside = aside(store.clone());
        store.set("tasks:abc", &"v".to_string()).await.unwrap();
        store.set("tasks:def", &"w".to_string()).await.unwrap();
        store.set_all("tasks", &["v".to_string()]).await.unwrap();

        aside.invalidate("abc").await;

        assert_eq!(store.get("tasks:abc").await.unwrap(), None);
        assert_eq!(store.get_all("tasks").await.unwrap(), None);
        assert_eq!(store.get("tasks:def").await.unwrap(), Some("w".to_string()));
    }

    #[tokio::test]
    async fn test_noop_store_always_loads() {
        let aside = aside(Arc::new(NoOpCache::<String>::new()));
        let loads = AtomicUsize::new(0);

        for _ in 0..3 {
            let fetched = aside
                .fetch("abc", || async {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>("v".to_string())
                })
                .await
                .unwrap();
            assert_eq!(fetched.status, CacheStatus::Miss);
        }
        assert_eq!(loads.load(Ordering::SeqCst), 3);
    }
}
