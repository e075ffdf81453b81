use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::RwLock;

use super::{GraphError, RelationshipStore};
use crate::model::CampaignConnection;

/// In-memory user → campaign edges.
#[derive(Default)]
pub struct MockRelationshipStore {
    edges: RwLock<HashMap<String, BTreeSet<String>>>,
    fail: AtomicBool,
    delay: RwLock<Option<Duration>>,
    calls: AtomicUsize,
}

impl MockRelationshipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `PARTICIPATED_IN` edge. Repeated edges count once, as in the graph query.
    pub fn connect(&self, user_id: &str, campaign_id: &str) {
        self.edges
            .write()
            .entry(user_id.to_string())
            .or_default()
            .insert(campaign_id.to_string());
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

impl RelationshipStore for MockRelationshipStore {
    async fn is_ready(&self) -> bool {
        !self.fail.load(Ordering::SeqCst)
    }

    async fn campaigns_for(&self, user_ids: &[String]) -> Result<Vec<CampaignConnection>, GraphError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.read();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(GraphError::QueryFailed {
                message: "injected failure".to_string(),
            });
        }

        let users: BTreeSet<&String> = user_ids.iter().collect();
        let edges = self.edges.read();
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for user in users {
            if let Some(campaigns) = edges.get(user) {
                for campaign in campaigns {
                    *counts.entry(campaign.clone()).or_insert(0) += 1;
                }
            }
        }

        Ok(counts
            .into_iter()
            .map(|(campaign_id, connections)| CampaignConnection::new(campaign_id, connections))
            .collect())
    }
}
