//! Request-scoped data model shared by the stores, the cache and the gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A neighbour returned by the similarity index.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatch {
    pub user_id: String,
    /// Similarity reported by the index (higher is closer).
    pub score: f32,
}

impl SimilarityMatch {
    pub fn new(user_id: impl Into<String>, score: f32) -> Self {
        Self {
            user_id: user_id.into(),
            score,
        }
    }
}

/// A campaign reached from the similar users, with the number of them connected to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignConnection {
    pub campaign_id: String,
    pub connections: u64,
}

impl CampaignConnection {
    pub fn new(campaign_id: impl Into<String>, connections: u64) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            connections,
        }
    }
}

/// One ranked entry of a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub campaign_id: String,
    pub ranking_score: u64,
    pub reason: String,
}

/// Where a recommendation list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalSource {
    Cache,
    Computed,
}

impl RetrievalSource {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            RetrievalSource::Cache => "cache",
            RetrievalSource::Computed => "computed",
        }
    }
}

impl std::fmt::Display for RetrievalSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value stored in the cache layer for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResult {
    pub user_id: String,
    pub recommendations: Vec<Recommendation>,
    /// Source of the list at the time it was computed (always `computed`).
    pub retrieval_source: RetrievalSource,
    pub inserted_at: DateTime<Utc>,
}

impl CachedResult {
    pub fn computed(user_id: impl Into<String>, recommendations: Vec<Recommendation>) -> Self {
        Self {
            user_id: user_id.into(),
            recommendations,
            retrieval_source: RetrievalSource::Computed,
            inserted_at: Utc::now(),
        }
    }
}
