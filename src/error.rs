//! Error types for store operations

use thiserror::Error;

/// Result type for store operations
pub type KvResult<T> = Result<T, KvError>;

/// Errors that can occur while talking to Redis.
///
/// Driver failures are carried through unchanged; this crate performs no
/// retry, fallback, or reinterpretation of its own.
#[derive(Error, Debug)]
pub enum KvError {
    /// Connection parameters failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Connection pool could not be built
    #[error("Failed to create connection pool: {0}")]
    CreatePool(#[from] deadpool_redis::CreatePoolError),

    /// Borrowing a connection from the pool failed
    #[error("Failed to get connection from pool: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    /// The Redis server rejected or failed a command
    #[error("Redis command failed: {0}")]
    Backend(#[from] redis::RedisError),

    /// Value could not be encoded for storage
    #[error("Value encoding failed: {0}")]
    Encode(String),

    /// Stored bytes could not be decoded back into a value
    #[error("Value decoding failed: {0}")]
    Decode(String),
}
