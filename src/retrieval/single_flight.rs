//! Per-key mutual exclusion for cache misses.
//!
//! Concurrent misses for the same key queue behind one leader; after the leader
//! finishes, each follower re-reads the cache instead of recomputing.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slots = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

/// Registry of in-flight keys.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    slots: Slots,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other holder owns `key`, then returns a guard that owns it.
    ///
    /// Dropping the returned future while it waits still releases the slot.
    pub async fn acquire(&self, key: &str) -> FlightGuard {
        let slot = {
            let mut slots = self.slots.lock();
            slots
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        // Declared before the wait so it outlives the pending lock on cancellation.
        let release = SlotRelease {
            key: key.to_string(),
            slots: self.slots.clone(),
        };
        let guard = slot.lock_owned().await;

        FlightGuard {
            _guard: guard,
            release,
        }
    }

    /// Number of keys currently held or awaited.
    pub fn in_flight(&self) -> usize {
        self.slots.lock().len()
    }
}

/// Removes `key` from the registry once nothing else references its slot.
struct SlotRelease {
    key: String,
    slots: Slots,
}

impl Drop for SlotRelease {
    fn drop(&mut self) {
        let mut slots = self.slots.lock();
        // Only the registry still references the slot: nobody holds or awaits it.
        let idle = slots
            .get(&self.key)
            .is_some_and(|slot| Arc::strong_count(slot) == 1);
        if idle {
            slots.remove(&self.key);
        }
    }
}

/// Ownership of one key; released on drop.
pub struct FlightGuard {
    // Field order matters: the lock is released before the registry check.
    _guard: OwnedMutexGuard<()>,
    release: SlotRelease,
}

impl std::fmt::Debug for FlightGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlightGuard")
            .field("key", &self.release.key)
            .finish_non_exhaustive()
    }
}
