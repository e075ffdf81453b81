use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::RwLock;

use super::{MetricsError, MetricsStore};

/// In-memory engagement scores. Uses the trait's default `scores_for`, so the call
/// counter reflects one call per campaign.
#[derive(Default)]
pub struct MockMetricsStore {
    scores: RwLock<HashMap<String, f64>>,
    fail: AtomicBool,
    delay: RwLock<Option<Duration>>,
    calls: AtomicUsize,
}

impl MockMetricsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_score(&self, campaign_id: &str, score: f64) {
        self.scores.write().insert(campaign_id.to_string(), score);
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write() = delay;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MetricsStore for MockMetricsStore {
    async fn is_ready(&self) -> bool {
        !self.fail.load(Ordering::SeqCst)
    }

    async fn score_for(&self, campaign_id: &str) -> Result<f64, MetricsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.read();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(MetricsError::WorkerFailed("injected failure".to_string()));
        }

        Ok(self.scores.read().get(campaign_id).copied().unwrap_or(0.0))
    }
}
