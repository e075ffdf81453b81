use std::time::Duration;

use tracing::info;

use super::RecommendationCache;
use super::error::CacheResult;
use super::memory::MemoryCache;
use super::redis_cache::RedisCache;
use crate::model::CachedResult;

/// Cache backend chosen at startup.
#[derive(Debug, Clone)]
pub enum CacheBackend {
    /// Process-local cache; each replica caches independently.
    Memory(MemoryCache),
    /// Shared Redis cache.
    Redis(RedisCache),
}

impl CacheBackend {
    /// Connects to Redis when `redis_url` is set, otherwise builds an in-process cache.
    pub async fn from_config(redis_url: Option<&str>, capacity: u64) -> CacheResult<Self> {
        match redis_url {
            Some(url) => {
                let cache = RedisCache::connect(url).await?;
                info!("Using Redis cache backend");
                Ok(Self::Redis(cache))
            }
            None => {
                info!(capacity = capacity, "Using in-process cache backend");
                Ok(Self::Memory(MemoryCache::with_capacity(capacity)))
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CacheBackend::Memory(_) => "memory",
            CacheBackend::Redis(_) => "redis",
        }
    }
}

impl RecommendationCache for CacheBackend {
    async fn is_ready(&self) -> bool {
        match self {
            CacheBackend::Memory(c) => c.is_ready().await,
            CacheBackend::Redis(c) => c.is_ready().await,
        }
    }

    async fn get(&self, key: &str) -> CacheResult<Option<CachedResult>> {
        match self {
            CacheBackend::Memory(c) => c.get(key).await,
            CacheBackend::Redis(c) => c.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &CachedResult, ttl: Duration) -> CacheResult<()> {
        match self {
            CacheBackend::Memory(c) => c.set(key, value, ttl).await,
            CacheBackend::Redis(c) => c.set(key, value, ttl).await,
        }
    }
}
