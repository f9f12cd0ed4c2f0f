use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

use crate::cache::{CacheBackend, CacheConfig};
use crate::error::{Result, TrackerError};
use crate::utils::{get_env_with_prefix, parse_env_with_prefix};

/// Main configuration for the task tracker service
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    /// Load sample tasks into the repository at startup
    #[serde(default)]
    pub seed: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum request body size in bytes (default: 1MB)
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
    /// Whole-request timeout; 0 disables it
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_size: default_max_body_size(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_body_size() -> usize {
    1024 * 1024
}

fn default_request_timeout_seconds() -> u64 {
    30
}

impl ServerConfig {
    pub fn addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_seconds > 0).then(|| Duration::from_secs(self.request_timeout_seconds))
    }
}

impl Config {
    /// Configuration from the environment, validated
    pub fn from_env() -> Result<Self> {
        ConfigBuilder::new().from_env().build()
    }
}

/// Builder for Config with environment variable support
#[must_use = "builder does nothing until you call build()"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.server.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.config.server.max_body_size = max_body_size;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.config.server.request_timeout_seconds = timeout.as_secs();
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.config.logging.json = enabled;
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.config.cache = cache;
        self
    }

    pub fn with_seed(mut self, enabled: bool) -> Self {
        self.config.seed = enabled;
        self
    }

    pub fn with_cache_backend(mut self, backend: CacheBackend) -> Self {
        self.config.cache.backend = backend;
        self
    }

    /// Load configuration from environment variables with TRACKER_ prefix
    pub fn from_env(mut self) -> Self {
        if let Some(host) = get_env_with_prefix("HOST") {
            self.config.server.host = host;
        }
        // TRACKER_PORT first, then PORT for platforms that inject it
        if let Some(port) = parse_env_with_prefix("PORT") {
            self.config.server.port = port;
        }
        if let Some(size) = parse_env_with_prefix("MAX_BODY_SIZE") {
            self.config.server.max_body_size = size;
        }
        if let Some(seconds) = parse_env_with_prefix("REQUEST_TIMEOUT_SECONDS") {
            self.config.server.request_timeout_seconds = seconds;
        }
        if let Some(level) = get_env_with_prefix("LOG_LEVEL") {
            self.config.logging.level = level;
        }
        if let Some(json) = get_env_with_prefix("LOG_JSON") {
            self.config.logging.json = json.parse().unwrap_or(false);
        }

        if let Some(seed) = parse_env_with_prefix("SEED") {
            self.config.seed = seed;
        }

        self.config.cache = CacheConfig::from_env();

        self
    }

    /// Build the configuration, validating all settings
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration is invalid:
    /// - Invalid server address (host:port) or port 0
    /// - Invalid log level
    /// - Zero maximum body size
    /// - Redis backend without a host or with a zero operation timeout
    pub fn build(self) -> Result<Config> {
        let config = self.config;

        config.server.addr().map_err(|e| {
            TrackerError::bad_request(format!(
                "Invalid server address {}:{} - {}",
                config.server.host, config.server.port, e
            ))
        })?;

        if config.server.port == 0 {
            return Err(TrackerError::bad_request(
                "Server port must be greater than 0",
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(TrackerError::bad_request(format!(
                "Invalid log level: {}. Must be one of: {}",
                config.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        if config.server.max_body_size == 0 {
            return Err(TrackerError::bad_request(
                "Maximum body size must be greater than 0",
            ));
        }

        #[cfg(feature = "cache-redis")]
        {
            if config.cache.backend == CacheBackend::Redis {
                if config.cache.redis.host.trim().is_empty() {
                    return Err(TrackerError::bad_request(
                        "Redis cache backend requires a host",
                    ));
                }
                if config.cache.redis.operation_timeout_ms == 0 {
                    return Err(TrackerError::bad_request(
                        "Cache operation timeout must be greater than 0",
                    ));
                }
            }
        }

        Ok(config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConfigBuilder::new().build().unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.cache.redis.address(), "localhost:6379");
        assert!(!config.seed);
    }

    #[test]
    fn test_seed_flag_from_env() {
        unsafe {
            std::env::set_var("TRACKER_SEED", "true");
        }
        let config = ConfigBuilder::new().from_env().build().unwrap();
        unsafe {
            std::env::remove_var("TRACKER_SEED");
        }
        assert!(config.seed);

        assert!(ConfigBuilder::new().with_seed(true).build().unwrap().seed);
    }

    #[test]
    fn test_zero_timeout_disables_request_timeout() {
        let config = ConfigBuilder::new()
            .with_request_timeout(Duration::ZERO)
            .build()
            .unwrap();
        assert_eq!(config.server.request_timeout(), None);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(ConfigBuilder::new().with_host("not a host").build().is_err());
        assert!(ConfigBuilder::new().with_port(0).build().is_err());
        assert!(ConfigBuilder::new().with_log_level("loud").build().is_err());
        assert!(ConfigBuilder::new().with_max_body_size(0).build().is_err());
    }

    #[cfg(feature = "cache-redis")]
    #[test]
    fn test_redis_backend_requires_host_and_timeout() {
        let mut cache = CacheConfig {
            backend: CacheBackend::Redis,
            ..Default::default()
        };
        assert!(ConfigBuilder::new().with_cache(cache.clone()).build().is_ok());

        cache.redis.host = String::new();
        assert!(ConfigBuilder::new().with_cache(cache.clone()).build().is_err());

        cache.redis.host = "localhost".to_string();
        cache.redis.operation_timeout_ms = 0;
        assert!(ConfigBuilder::new().with_cache(cache).build().is_err());
    }
}
