use std::time::Duration;

use thiserror::Error;

use crate::graph::GraphError;
use crate::metrics::MetricsError;
use crate::vectordb::VectorDbError;

/// Backing store that failed during a retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    SimilarityIndex,
    RelationshipStore,
    MetricsStore,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::SimilarityIndex => "similarity_index",
            StoreKind::RelationshipStore => "relationship_store",
            StoreKind::MetricsStore => "metrics_store",
        }
    }
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Underlying cause of a [`RetrievalError::StoreUnavailable`].
#[derive(Debug, Error)]
pub enum StoreFailure {
    /// The call did not complete within the configured store timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    VectorDb(#[from] VectorDbError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

/// Errors returned by [`crate::retrieval::RetrievalOrchestrator`].
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The user identifier is malformed; no store was contacted.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The similarity index holds no embedding for this user.
    #[error("user not found: {user_id}")]
    UserNotFound { user_id: String },

    /// A backing store failed or timed out.
    #[error("{store} unavailable: {source}")]
    StoreUnavailable {
        store: StoreKind,
        #[source]
        source: StoreFailure,
    },
}

impl RetrievalError {
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            RetrievalError::StoreUnavailable {
                source: StoreFailure::Timeout(_),
                ..
            }
        )
    }
}
