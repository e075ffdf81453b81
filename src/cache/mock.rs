use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use super::RecommendationCache;
use super::error::{CacheError, CacheResult};
use crate::model::CachedResult;

/// Manually advanced clock shared between a test and a [`MockCache`].
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    now_ms: Arc<AtomicU64>,
}

impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now_ms
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

struct MockEntry {
    value: CachedResult,
    expires_at_ms: u64,
}

/// In-memory cache with a controllable clock, call counters and failure switches.
#[derive(Default)]
pub struct MockCache {
    entries: Mutex<HashMap<String, MockEntry>>,
    clock: MockClock,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    get_calls: AtomicUsize,
    set_calls: AtomicUsize,
}

impl MockCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(clock: MockClock) -> Self {
        Self {
            clock,
            ..Self::default()
        }
    }

    pub fn clock(&self) -> &MockClock {
        &self.clock
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    /// Number of unexpired entries.
    pub fn live_entries(&self) -> usize {
        let now = self.clock.now_ms();
        self.entries
            .lock()
            .values()
            .filter(|e| e.expires_at_ms > now)
            .count()
    }

    /// Reads an entry without counting the call or honouring failure switches.
    pub fn peek(&self, key: &str) -> Option<CachedResult> {
        let now = self.clock.now_ms();
        self.entries
            .lock()
            .get(key)
            .filter(|e| e.expires_at_ms > now)
            .map(|e| e.value.clone())
    }
}

impl RecommendationCache for MockCache {
    async fn is_ready(&self) -> bool {
        !self.fail_reads.load(Ordering::SeqCst)
    }

    async fn get(&self, key: &str) -> CacheResult<Option<CachedResult>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("injected read failure".to_string()));
        }

        let now = self.clock.now_ms();
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at_ms > now => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &CachedResult, ttl: Duration) -> CacheResult<()> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("injected write failure".to_string()));
        }

        let expires_at_ms = self.clock.now_ms() + ttl.as_millis() as u64;
        self.entries.lock().insert(
            key.to_string(),
            MockEntry {
                value: value.clone(),
                expires_at_ms,
            },
        );
        Ok(())
    }
}
