use thiserror::Error;

/// Errors from cache backends and the cache switch.
#[derive(Debug, Error)]
pub enum CacheError {
    /// A typed value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A backend's internal lock was poisoned by a panicking writer.
    #[error("cache lock poisoned: {0}")]
    LockPoisoned(String),

    /// The cache type string or configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
