//! Pre-aggregated campaign engagement (SQLite).

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod sqlite;


use std::collections::HashMap;

pub use error::MetricsError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockMetricsStore;
pub use sqlite::SqliteMetricsStore;

/// Read-side interface to campaign engagement scores.
pub trait MetricsStore: Send + Sync {
    /// Returns `true` if the store is reachable.
    fn is_ready(&self) -> impl std::future::Future<Output = bool> + Send;

    /// Engagement score of one campaign. Unknown campaigns score `0`.
    fn score_for(
        &self,
        campaign_id: &str,
    ) -> impl std::future::Future<Output = Result<f64, MetricsError>> + Send;

    /// Scores for several campaigns; every requested id is present in the result.
    fn scores_for(
        &self,
        campaign_ids: &[String],
    ) -> impl std::future::Future<Output = Result<HashMap<String, f64>, MetricsError>> + Send {
        async move {
            let mut scores = HashMap::with_capacity(campaign_ids.len());
            for id in campaign_ids {
                let score = self.score_for(id).await?;
                scores.insert(id.clone(), score);
            }
            Ok(scores)
        }
    }
}
