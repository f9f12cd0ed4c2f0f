use std::time::Duration;

/// Failure reported by a cache backend.
///
/// A miss is never one of these: stores report a miss as `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The backend could not be reached or rejected the command
    #[error("cache {operation} failed: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },

    /// A value could not be encoded, or stored bytes could not be decoded
    #[error("cache serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend did not answer within the configured bound
    #[error("cache {operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// The store was closed and no longer holds a connection
    #[error("cache connection is closed")]
    Closed,

    /// A writer panicked while holding the store's lock
    #[error("cache lock poisoned")]
    Poisoned,

    #[error("invalid cache configuration: {0}")]
    Configuration(String),
}

impl CacheError {
    pub fn transport(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Transport {
            operation,
            message: err.to_string(),
        }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

/// Result type alias for cache store operations
pub type CacheResult<T> = std::result::Result<T, CacheError>;
