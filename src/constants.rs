//! Cross-cutting, shared constants.
//!
//! Runtime configuration ([`crate::config::Config`]) defaults to these values; the
//! constants remain the single source for tests and static checks.

/// Dimension of the user embeddings produced by the ingestion pipeline.
pub const DEFAULT_EMBEDDING_DIM: usize = 1024;

/// Number of nearest users consulted per request.
pub const DEFAULT_SIMILARITY_K: u64 = 5;

/// Lifetime of a cached recommendation list.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Upper bound for any single call to a backing store.
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 2_000;

/// Max entries held by the in-process cache backend.
pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

/// Longest accepted user identifier, in bytes.
pub const MAX_USER_ID_LEN: usize = 100;

/// Prefix applied to every cache key.
pub const CACHE_KEY_PREFIX: &str = "rec";

/// Reason attached to recommendations sourced from similar users.
pub const SIMILAR_USERS_REASON: &str = "Recommended based on users with similar interests.";

/// Dimension check used at store boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimConfig {
    /// The embedding vector dimension (number of floats).
    pub embedding_dim: usize,
}

impl Default for DimConfig {
    fn default() -> Self {
        Self {
            embedding_dim: DEFAULT_EMBEDDING_DIM,
        }
    }
}

impl DimConfig {
    /// Creates a new dimension configuration with the specified embedding dimension.
    pub fn new(embedding_dim: usize) -> Self {
        Self { embedding_dim }
    }

    /// Checks that `actual` matches this configuration.
    pub fn check(&self, actual: usize) -> Result<(), DimValidationError> {
        validate_embedding_dim(actual, self.embedding_dim)
    }
}

/// Error returned when dimension validation fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DimValidationError {
    /// Runtime dimension does not match expected dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Validates that a runtime embedding dimension matches the expected dimension.
///
/// # Example
///
/// ```
/// use recs::constants::{validate_embedding_dim, DEFAULT_EMBEDDING_DIM};
///
/// validate_embedding_dim(1024, DEFAULT_EMBEDDING_DIM).unwrap();
/// ```
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimValidationError> {
    if actual != expected {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
