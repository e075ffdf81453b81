use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by cache backends.
pub enum CacheError {
    /// Redis command or connection failure.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Cached value could not be encoded or decoded.
    #[error("cache serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend refused the operation.
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

pub type CacheResult<T> = Result<T, CacheError>;
