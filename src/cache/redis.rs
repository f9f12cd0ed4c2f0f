//! Redis-backed cache store
//!
//! Values are JSON-encoded and written under `<key_prefix><key>`. Absence is
//! reported by Redis as a nil reply, which maps to a miss. Every round trip is
//! bounded by the configured operation timeout, and dropping an operation's
//! future abandons the in-flight call.

use crate::cache::{CacheError, CacheResult, RedisSettings};
use crate::traits::cache::CacheStore;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::RwLock;
use std::time::Duration;

/// Redis cache for values of type `T`
///
/// Holds one long-lived multiplexed connection, opened and verified with
/// `PING` in [`RedisCache::connect`]. Clones of the connection are cheap and
/// share the same socket, so concurrent requests pipeline over it.
pub struct RedisCache<T> {
    connection: RwLock<Option<MultiplexedConnection>>,
    key_prefix: String,
    ttl: Option<Duration>,
    operation_timeout: Duration,
    _entity: PhantomData<fn() -> T>,
}

impl<T> RedisCache<T> {
    /// Connect to Redis and verify reachability
    ///
    /// Fails fast when the server cannot be reached or does not answer `PING`
    /// within the operation timeout.
    pub async fn connect(settings: &RedisSettings) -> CacheResult<Self> {
        let operation_timeout = settings.operation_timeout();
        if operation_timeout.is_zero() {
            return Err(CacheError::configuration(
                "operation timeout must be greater than 0",
            ));
        }

        let client = redis::Client::open(settings.connection_url()).map_err(|e| {
            CacheError::configuration(format!(
                "invalid Redis settings for {}: {}",
                settings.address(),
                e
            ))
        })?;

        let mut connection = bounded(
            operation_timeout,
            "CONNECT",
            client.get_multiplexed_async_connection(),
        )
        .await?;

        bounded(
            operation_timeout,
            "PING",
            redis::cmd("PING").query_async::<String>(&mut connection),
        )
        .await?;

        Ok(Self {
            connection: RwLock::new(Some(connection)),
            key_prefix: settings.key_prefix.clone(),
            ttl: settings.ttl(),
            operation_timeout,
            _entity: PhantomData,
        })
    }

    /// Compose the key actually sent to Redis
    pub fn format_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// TTL applied by [`CacheStore::set`] and [`CacheStore::set_all`]
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Release the connection. Later operations fail with [`CacheError::Closed`].
    pub fn shutdown(&self) -> CacheResult<()> {
        self.connection
            .write()
            .map_err(|_| CacheError::Poisoned)?
            .take();
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.connection
            .read()
            .map(|conn| conn.is_none())
            .unwrap_or(true)
    }

    fn connection(&self) -> CacheResult<MultiplexedConnection> {
        self.connection
            .read()
            .map_err(|_| CacheError::Poisoned)?
            .clone()
            .ok_or(CacheError::Closed)
    }

    async fn fetch<V: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<V>> {
        let mut conn = self.connection()?;
        let bytes: Option<Vec<u8>> = bounded(
            self.operation_timeout,
            "GET",
            redis::cmd("GET")
                .arg(self.format_key(key))
                .query_async(&mut conn),
        )
        .await?;

        bytes.map(|bytes| decode(&bytes)).transpose()
    }

    async fn store<V: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &V,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let payload = encode(value)?;
        let mut conn = self.connection()?;

        let mut cmd = redis::cmd("SET");
        cmd.arg(self.format_key(key)).arg(payload);
        if let Some(millis) = expiry_millis(ttl) {
            cmd.arg("PX").arg(millis);
        }

        bounded(self.operation_timeout, "SET", cmd.query_async::<()>(&mut conn)).await
    }

    async fn remove(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.connection()?;
        // DEL answers with the number of removed keys; 0 is still success.
        bounded(
            self.operation_timeout,
            "DEL",
            redis::cmd("DEL")
                .arg(self.format_key(key))
                .query_async::<i64>(&mut conn),
        )
        .await?;
        Ok(())
    }
}

impl<T> RedisCache<T>
where
    T: Serialize + Send + Sync + 'static,
{
    /// Store a value with an explicit TTL, overriding the configured one
    ///
    /// `None` or a zero duration stores the value without expiry.
    pub async fn set_with_ttl(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        self.store(key, value, ttl).await
    }
}

#[async_trait]
impl<T> CacheStore<T> for RedisCache<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> CacheResult<Option<T>> {
        self.fetch(key).await
    }

    async fn set(&self, key: &str, value: &T) -> CacheResult<()> {
        self.store(key, value, self.ttl).await
    }

    async fn invalidate(&self, key: &str) -> CacheResult<()> {
        self.remove(key).await
    }

    async fn get_all(&self, namespace: &str) -> CacheResult<Option<Vec<T>>> {
        self.fetch(namespace).await
    }

    async fn set_all(&self, namespace: &str, values: &[T]) -> CacheResult<()> {
        self.store(namespace, values, self.ttl).await
    }

    async fn invalidate_all(&self, namespace: &str) -> CacheResult<()> {
        self.remove(namespace).await
    }

    async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.connection()?;
        bounded(
            self.operation_timeout,
            "PING",
            redis::cmd("PING").query_async::<String>(&mut conn),
        )
        .await?;
        Ok(())
    }

    async fn close(&self) -> CacheResult<()> {
        self.shutdown()
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

/// Run a Redis round trip under a deadline
async fn bounded<F, R>(limit: Duration, operation: &'static str, fut: F) -> CacheResult<R>
where
    F: Future<Output = redis::RedisResult<R>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(CacheError::transport(operation, e)),
        Err(_) => Err(CacheError::Timeout {
            operation,
            after: limit,
        }),
    }
}

/// `PX` argument for a TTL; zero means no expiry, sub-millisecond rounds up
fn expiry_millis(ttl: Option<Duration>) -> Option<u64> {
    ttl.filter(|ttl| !ttl.is_zero())
        .map(|ttl| u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1))
}

fn encode<V: Serialize + ?Sized>(value: &V) -> CacheResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

fn decode<V: DeserializeOwned>(bytes: &[u8]) -> CacheResult<V> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: String,
        title: String,
    }

    #[test]
    fn test_encode_decode_preserves_fields() {
        let item = Item {
            id: "abc".to_string(),
            title: "T".to_string(),
        };
        let bytes = encode(&item).unwrap();
        assert_eq!(decode::<Item>(&bytes).unwrap(), item);
    }

    #[test]
    fn test_zero_ttl_means_no_expiry() {
        assert_eq!(expiry_millis(None), None);
        assert_eq!(expiry_millis(Some(Duration::ZERO)), None);
        assert_eq!(expiry_millis(Some(Duration::from_micros(10))), Some(1));
        assert_eq!(expiry_millis(Some(Duration::from_secs(300))), Some(300_000));
    }

    #[test]
    fn test_foreign_bytes_are_a_serialization_error() {
        let result = decode::<Item>(b"\x00not json");
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_bounded_reports_timeout() {
        let result: CacheResult<()> = bounded(
            Duration::from_millis(10),
            "GET",
            std::future::pending::<redis::RedisResult<()>>(),
        )
        .await;

        assert!(matches!(
            result,
            Err(CacheError::Timeout { operation: "GET", .. })
        ));
    }

    #[tokio::test]
    async fn test_connect_fails_fast_when_unreachable() {
        let settings = RedisSettings {
            host: "127.0.0.1".to_string(),
            port: 1, // nothing listens here
            operation_timeout_ms: 200,
            ..Default::default()
        };

        let result = RedisCache::<Item>::connect(&settings).await;
        assert!(matches!(
            result,
            Err(CacheError::Transport { .. }) | Err(CacheError::Timeout { .. })
        ));
    }

    #[tokio::test]
    async fn test_zero_timeout_is_rejected() {
        let settings = RedisSettings {
            operation_timeout_ms: 0,
            ..Default::default()
        };

        let result = RedisCache::<Item>::connect(&settings).await;
        assert!(matches!(result, Err(CacheError::Configuration(_))));
    }

    // The tests below need a Redis server on 127.0.0.1:6379.

    fn live_settings(prefix: &str) -> RedisSettings {
        RedisSettings {
            host: "127.0.0.1".to_string(),
            key_prefix: prefix.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    #[ignore] // Requires Redis
    async fn test_redis_round_trip_and_invalidate() {
        let cache = RedisCache::<Item>::connect(&live_settings("test:round-trip:"))
            .await
            .unwrap();
        let item = Item {
            id: "abc".to_string(),
            title: "T".to_string(),
        };

        assert_eq!(cache.get("tasks:abc").await.unwrap(), None);
        cache.set("tasks:abc", &item).await.unwrap();
        assert_eq!(cache.get("tasks:abc").await.unwrap(), Some(item.clone()));

        cache.invalidate("tasks:abc").await.unwrap();
        assert_eq!(cache.get("tasks:abc").await.unwrap(), None);
        cache.invalidate("tasks:abc").await.unwrap();

        cache.set_all("tasks", &[item.clone()]).await.unwrap();
        assert_eq!(cache.get_all("tasks").await.unwrap(), Some(vec![item]));
        cache.invalidate_all("tasks").await.unwrap();
        assert_eq!(cache.get_all("tasks").await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore] // Requires Redis
    async fn test_redis_ttl_expires_entry() {
        let cache = RedisCache::<Item>::connect(&live_settings("test:ttl:"))
            .await
            .unwrap();
        let item = Item {
            id: "ttl".to_string(),
            title: "short".to_string(),
        };

        cache
            .set_with_ttl("tasks:ttl", &item, Some(Duration::from_millis(50)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(cache.get("tasks:ttl").await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore] // Requires Redis
    async fn test_operations_after_close_fail_cleanly() {
        let cache = RedisCache::<Item>::connect(&live_settings("test:close:"))
            .await
            .unwrap();
        cache.close().await.unwrap();

        assert!(cache.is_closed());
        assert!(matches!(cache.get("tasks:abc").await, Err(CacheError::Closed)));
        assert!(matches!(cache.invalidate("tasks:abc").await, Err(CacheError::Closed)));
        assert!(matches!(cache.ping().await, Err(CacheError::Closed)));
    }
}
