//! Cache error types for qbank-cache.

/// Errors from cache backends and the cache synchronizer.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The backend could not be reached or rejected the command.
    #[error("cache transport error: {0}")]
    Transport(String),

    /// A cached value could not be encoded or decoded.
    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A key pattern is not a valid glob.
    #[error("invalid key pattern: {0}")]
    InvalidPattern(String),
}
