//! Shared cache backend (Redis). Values are JSON; expiry is delegated to `PSETEX`.

use std::time::Duration;

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::{debug, instrument, warn};

use super::RecommendationCache;
use super::error::CacheResult;
use crate::model::CachedResult;

/// Redis-backed recommendation cache.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache").finish_non_exhaustive()
    }
}

impl RedisCache {
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }

    /// Millisecond expiry, truncated so an entry never outlives `ttl`. Redis rejects 0.
    fn ttl_millis(ttl: Duration) -> u64 {
        u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
    }

    pub async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

impl RecommendationCache for RedisCache {
    async fn is_ready(&self) -> bool {
        self.ping().await.is_ok()
    }

    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> CacheResult<Option<CachedResult>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(key).await?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        match serde_json::from_str::<CachedResult>(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key = %key, error = %e, "Cache deserialization failed, dropping entry");
                let _ = conn.del::<_, ()>(key).await;
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, value), fields(ttl_ms = Self::ttl_millis(ttl)))]
    async fn set(&self, key: &str, value: &CachedResult, ttl: Duration) -> CacheResult<()> {
        let payload = serde_json::to_string(value)?;
        let mut conn = self.conn.clone();
        conn.pset_ex::<_, _, ()>(key, payload, Self::ttl_millis(ttl))
            .await?;
        debug!("Cached recommendations");
        Ok(())
    }
}
