//! In-memory cache backed by a lock-guarded map
//!
//! Entries live until they are invalidated or the process exits. There is no
//! eviction and no expiry, so the map grows with the number of distinct keys
//! written. Size the deployment accordingly or use the Redis backend when the
//! key space is large.

use crate::cache::{CacheError, CacheResult};
use crate::traits::cache::CacheStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Internal state. Items and collections share one lock so every operation
/// on the store is ordered against every other.
struct InMemoryState<T> {
    items: HashMap<String, T>,
    collections: HashMap<String, Vec<T>>,
}

impl<T> Default for InMemoryState<T> {
    fn default() -> Self {
        Self {
            items: HashMap::new(),
            collections: HashMap::new(),
        }
    }
}

/// Unbounded in-process cache for values of type `T`
///
/// Reads take the shared lock and may run in parallel. Writes and
/// invalidations take the exclusive lock. `get` always returns a clone, so
/// callers can never mutate cached state behind the store's back.
///
/// # Example
///
/// ```rust,ignore
/// use task_tracker::cache::InMemoryCache;
/// use task_tracker::CacheStore;
///
/// let cache = InMemoryCache::<Task>::new();
/// cache.set("tasks:abc", &task).await?;
/// assert_eq!(cache.get("tasks:abc").await?, Some(task));
/// ```
pub struct InMemoryCache<T> {
    state: RwLock<InMemoryState<T>>,
}

impl<T> InMemoryCache<T> {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(InMemoryState::default()),
        }
    }

    /// Number of entries currently held, items and collections alike
    pub fn len(&self) -> CacheResult<usize> {
        let state = self.read()?;
        Ok(state.items.len() + state.collections.len())
    }

    pub fn is_empty(&self) -> CacheResult<bool> {
        let state = self.read()?;
        Ok(state.items.is_empty() && state.collections.is_empty())
    }

    fn read(&self) -> CacheResult<RwLockReadGuard<'_, InMemoryState<T>>> {
        self.state.read().map_err(|_| CacheError::Poisoned)
    }

    fn write(&self) -> CacheResult<RwLockWriteGuard<'_, InMemoryState<T>>> {
        self.state.write().map_err(|_| CacheError::Poisoned)
    }
}

impl<T> Default for InMemoryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> CacheStore<T> for InMemoryCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> CacheResult<Option<T>> {
        Ok(self.read()?.items.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &T) -> CacheResult<()> {
        self.write()?.items.insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> CacheResult<()> {
        self.write()?.items.remove(key);
        Ok(())
    }

    async fn get_all(&self, namespace: &str) -> CacheResult<Option<Vec<T>>> {
        Ok(self.read()?.collections.get(namespace).cloned())
    }

    async fn set_all(&self, namespace: &str, values: &[T]) -> CacheResult<()> {
        self.write()?
            .collections
            .insert(namespace.to_string(), values.to_vec());
        Ok(())
    }

    async fn invalidate_all(&self, namespace: &str) -> CacheResult<()> {
        self.write()?.collections.remove(namespace);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
