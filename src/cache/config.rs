use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::utils::{get_env_with_prefix, parse_env_with_prefix};

/// Cache backend type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// In-process map (default)
    #[default]
    #[serde(alias = "inmemory")]
    Memory,
    /// Redis (requires the cache-redis feature)
    #[cfg(feature = "cache-redis")]
    Redis,
    /// Caching disabled
    NoOp,
}

impl CacheBackend {
    /// Backend selected by a `CACHE_BACKEND` value, `None` if unrecognised
    fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "memory" | "inmemory" | "in_memory" | "in-memory" => Some(Self::Memory),
            "redis" => {
                #[cfg(feature = "cache-redis")]
                {
                    Some(Self::Redis)
                }
                #[cfg(not(feature = "cache-redis"))]
                {
                    tracing::warn!(
                        "Redis cache requested but cache-redis feature not enabled, using in-memory"
                    );
                    Some(Self::Memory)
                }
            }
            "noop" | "none" | "disabled" => Some(Self::NoOp),
            _ => None,
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,

    #[serde(default)]
    pub redis: RedisSettings,
}

/// Connection and policy settings for the Redis backend
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisSettings {
    #[serde(default = "default_redis_host")]
    pub host: String,

    #[serde(default = "default_redis_port")]
    pub port: u16,

    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    /// Logical database index selected after connecting
    #[serde(default)]
    pub db: i64,

    /// Prepended to every key so several services can share one server
    #[serde(default)]
    pub key_prefix: String,

    /// TTL applied to every entry on write; 0 stores entries without expiry
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,

    /// Upper bound for a single round trip, connection setup included
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            host: default_redis_host(),
            port: default_redis_port(),
            password: None,
            db: 0,
            key_prefix: String::new(),
            ttl_seconds: default_ttl_seconds(),
            operation_timeout_ms: default_operation_timeout_ms(),
        }
    }
}

impl RedisSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Connection URL in the form `redis://[:password@]host:port/db`
    pub fn connection_url(&self) -> String {
        match self.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => format!(
                "redis://:{}@{}/{}",
                urlencoding::encode(password),
                self.address(),
                self.db
            ),
            None => format!("redis://{}/{}", self.address(), self.db),
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_seconds > 0).then(|| Duration::from_secs(self.ttl_seconds))
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

impl CacheConfig {
    /// Load cache configuration from environment variables
    ///
    /// Reads `CACHE_BACKEND` (`memory`, `redis`, `noop`), `REDIS_HOST`,
    /// `REDIS_PORT`, `REDIS_PASSWORD`, `REDIS_DB`, `CACHE_KEY_PREFIX`,
    /// `CACHE_TTL_SECONDS` and `CACHE_TIMEOUT_MS`, each optionally prefixed
    /// with `TRACKER_`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(backend) = get_env_with_prefix("CACHE_BACKEND") {
            config.backend = CacheBackend::from_name(&backend).unwrap_or_else(|| {
                tracing::warn!(
                    backend = %backend,
                    "Unknown CACHE_BACKEND, using in-memory"
                );
                CacheBackend::Memory
            });
        }

        if let Some(host) = get_env_with_prefix("REDIS_HOST") {
            config.redis.host = host;
        }
        if let Some(port) = parse_env_with_prefix("REDIS_PORT") {
            config.redis.port = port;
        }
        if let Some(password) = get_env_with_prefix("REDIS_PASSWORD") {
            config.redis.password = Some(password);
        }
        if let Some(db) = parse_env_with_prefix("REDIS_DB") {
            config.redis.db = db;
        }
        if let Some(prefix) = get_env_with_prefix("CACHE_KEY_PREFIX") {
            config.redis.key_prefix = prefix;
        }
        if let Some(ttl) = parse_env_with_prefix("CACHE_TTL_SECONDS") {
            config.redis.ttl_seconds = ttl;
        }
        if let Some(timeout) = parse_env_with_prefix("CACHE_TIMEOUT_MS") {
            config.redis.operation_timeout_ms = timeout;
        }

        config
    }
}

fn default_redis_host() -> String {
    "localhost".to_string()
}

fn default_redis_port() -> u16 {
    6379
}

fn default_ttl_seconds() -> u64 {
    300 // 5 minutes
}

fn default_operation_timeout_ms() -> u64 {
    500
}
