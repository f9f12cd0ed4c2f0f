use crate::cache::CacheResult;
use crate::traits::cache::CacheStore;
use async_trait::async_trait;
use std::marker::PhantomData;

/// No-op cache implementation
///
/// Every lookup misses and every write succeeds without storing anything.
/// Wiring this in disables caching while the coordinator keeps the exact
/// same call sequence and error handling paths.
pub struct NoOpCache<T> {
    _entity: PhantomData<fn() -> T>,
}

impl<T> NoOpCache<T> {
    pub fn new() -> Self {
        Self {
            _entity: PhantomData,
        }
    }
}

impl<T> Default for NoOpCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for NoOpCache<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> CacheStore<T> for NoOpCache<T>
where
    T: Send + Sync + 'static,
{
    async fn get(&self, _key: &str) -> CacheResult<Option<T>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &T) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _key: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn get_all(&self, _namespace: &str) -> CacheResult<Option<Vec<T>>> {
        Ok(None)
    }

    async fn set_all(&self, _namespace: &str, _values: &[T]) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate_all(&self, _namespace: &str) -> CacheResult<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "noop"
    }
}
