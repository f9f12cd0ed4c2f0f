//! Cache store trait for typed key-value caching
//!
//! Every backend (in-memory, Redis, no-op) implements this contract with the
//! same hit/miss/invalidate semantics, so the cache-aside coordinator can run
//! against any of them without branching.

use crate::cache::CacheResult;
use async_trait::async_trait;

/// Typed cache store for entities of type `T`
///
/// Keys are opaque strings to the store. Item keys look like
/// `"<namespace>:<id>"` and collection keys are the bare `"<namespace>"`;
/// building them is the coordinator's job (see [`crate::cache::CacheAside`]).
///
/// Implementations must not log or emit metrics. Their only side effect is
/// the state of the backing store.
#[async_trait]
pub trait CacheStore<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Look up a single entry
    ///
    /// Returns `Ok(None)` on a miss. Returns `Err` only when the backend
    /// itself fails (transport, decoding).
    async fn get(&self, key: &str) -> CacheResult<Option<T>>;

    /// Store or overwrite a single entry
    async fn set(&self, key: &str, value: &T) -> CacheResult<()>;

    /// Remove a single entry. Removing an absent key succeeds.
    async fn invalidate(&self, key: &str) -> CacheResult<()>;

    /// Look up the cached ordered collection for a namespace
    async fn get_all(&self, namespace: &str) -> CacheResult<Option<Vec<T>>>;

    /// Store or overwrite the ordered collection for a namespace
    async fn set_all(&self, namespace: &str, values: &[T]) -> CacheResult<()>;

    /// Remove the collection for a namespace. Removing an absent one succeeds.
    async fn invalidate_all(&self, namespace: &str) -> CacheResult<()>;

    /// Check that the backend is reachable
    async fn ping(&self) -> CacheResult<()> {
        Ok(())
    }

    /// Release backend resources. Operations after `close` fail with
    /// [`CacheError::Closed`](crate::cache::CacheError::Closed) where the
    /// backend holds a connection.
    async fn close(&self) -> CacheResult<()> {
        Ok(())
    }

    /// Short backend name used in logs and health reports
    fn backend(&self) -> &'static str;
}
