//! Error types for the Tollgate rate limiter.

use thiserror::Error;

/// Errors raised by the shared key-value store.
///
/// The policy store masks these (fail open); the counter store and lock
/// path surface them so the processing strategy can tell a store failure
/// apart from "no counter yet".
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached or rejected the operation
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored value could not be serialized or deserialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Main error type for Tollgate operations.
#[derive(Error, Debug)]
pub enum RateLimitError {
    /// Configuration-related errors
    #[error("configuration error: {0}")]
    Config(String),

    /// A caller-supplied argument was unusable
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Key-value store errors
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Tollgate operations.
pub type Result<T> = std::result::Result<T, RateLimitError>;
