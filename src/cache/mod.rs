//! Cache layer for computed recommendation lists.
//!
//! Backends enforce expiry themselves; callers never keep a local copy of a cached value.

pub mod backend;
pub mod error;
pub mod memory;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod redis_cache;


use std::time::Duration;

pub use backend::CacheBackend;
pub use error::{CacheError, CacheResult};
pub use memory::MemoryCache;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockCache, MockClock};
pub use redis_cache::RedisCache;

use crate::model::CachedResult;

/// Key/value store for ranked results with a per-write TTL.
///
/// Implementations must make a `set` visible to a following `get` of the same key in
/// the same process, and must never return an entry older than its TTL.
pub trait RecommendationCache: Send + Sync {
    /// Returns `true` if the backend is reachable.
    fn is_ready(&self) -> impl std::future::Future<Output = bool> + Send;

    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = CacheResult<Option<CachedResult>>> + Send;

    fn set(
        &self,
        key: &str,
        value: &CachedResult,
        ttl: Duration,
    ) -> impl std::future::Future<Output = CacheResult<()>> + Send;
}
