//! In-process cache backend (moka) with per-entry TTL.

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::sync::Cache;

use super::RecommendationCache;
use super::error::CacheResult;
use crate::constants::DEFAULT_CACHE_CAPACITY;
use crate::model::CachedResult;

#[derive(Debug, Clone)]
struct CacheSlot {
    value: Arc<CachedResult>,
    ttl: Duration,
}

/// Expires each slot after the TTL it was written with; an overwrite restarts the clock.
struct SlotExpiry;

impl Expiry<String, CacheSlot> for SlotExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheSlot,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheSlot,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Bounded in-memory recommendation cache.
#[derive(Clone)]
pub struct MemoryCache {
    entries: Cache<String, CacheSlot>,
}

impl MemoryCache {
    /// Creates a cache with the default capacity.
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Creates a cache with a max entry capacity (LRU eviction).
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .expire_after(SlotExpiry)
                .build(),
        }
    }

    /// Returns the cached value for `key` if it has not expired.
    #[inline]
    pub fn lookup(&self, key: &str) -> Option<CachedResult> {
        self.entries.get(key).map(|slot| (*slot.value).clone())
    }

    #[inline]
    pub fn insert(&self, key: &str, value: CachedResult, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            CacheSlot {
                value: Arc::new(value),
                ttl,
            },
        );
    }

    #[inline]
    pub fn remove(&self, key: &str) -> Option<CachedResult> {
        self.entries.remove(key).map(|slot| (*slot.value).clone())
    }

    /// Returns the number of cached entries (approximate until pending tasks run).
    #[inline]
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.entry_count() == 0
    }

    /// Runs any pending maintenance tasks in the underlying cache.
    #[inline]
    pub fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks();
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

impl RecommendationCache for MemoryCache {
    async fn is_ready(&self) -> bool {
        true
    }

    async fn get(&self, key: &str) -> CacheResult<Option<CachedResult>> {
        Ok(self.lookup(key))
    }

    async fn set(&self, key: &str, value: &CachedResult, ttl: Duration) -> CacheResult<()> {
        self.insert(key, value.clone(), ttl);
        Ok(())
    }
}
