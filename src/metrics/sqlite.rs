//! SQLite-backed engagement aggregates.
//!
//! The ingestion pipeline writes one `user_analytics` row per (user, campaign) with
//! the number of interactions. A campaign's score is the sum over its rows.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{Connection, params, params_from_iter};
use tracing::{debug, instrument};

use super::MetricsStore;
use super::error::MetricsError;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS user_analytics (
        user_id VARCHAR(100),
        campaign_id VARCHAR(100),
        engagement_count INTEGER,
        PRIMARY KEY (user_id, campaign_id)
    );
"#;

/// Engagement store over a single SQLite connection.
///
/// `rusqlite::Connection` is not `Sync`; calls are serialised through a mutex and run
/// on the blocking pool so they never stall the async workers.
#[derive(Clone)]
pub struct SqliteMetricsStore {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteMetricsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteMetricsStore").finish_non_exhaustive()
    }
}

impl SqliteMetricsStore {
    /// Opens (creating if needed) the database at `path` and ensures the table exists.
    pub fn open(path: &Path) -> Result<Self, MetricsError> {
        let conn = Connection::open(path).map_err(|source| MetricsError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        conn.execute_batch(CREATE_TABLE)
            .map_err(|source| MetricsError::OpenFailed {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self, MetricsError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(CREATE_TABLE)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Upserts an aggregate row, as the ingestion pipeline does.
    pub fn upsert_engagement(
        &self,
        user_id: &str,
        campaign_id: &str,
        engagement_count: i64,
    ) -> Result<(), MetricsError> {
        self.conn.lock().execute(
            "INSERT OR REPLACE INTO user_analytics (user_id, campaign_id, engagement_count) \
             VALUES (?1, ?2, ?3)",
            params![user_id, campaign_id, engagement_count],
        )?;
        Ok(())
    }

    async fn run_blocking<T, F>(&self, f: F) -> Result<T, MetricsError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, MetricsError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            f(&guard)
        })
        .await
        .map_err(|e| MetricsError::WorkerFailed(e.to_string()))?
    }

    #[instrument(skip(self))]
    async fn total_engagement(&self, campaign_id: &str) -> Result<f64, MetricsError> {
        let campaign_id = campaign_id.to_string();
        self.run_blocking(move |conn| {
            let total: i64 = conn.query_row(
                "SELECT COALESCE(SUM(engagement_count), 0) FROM user_analytics WHERE campaign_id = ?1",
                params![campaign_id],
                |row| row.get(0),
            )?;
            Ok(total as f64)
        })
        .await
    }

    #[instrument(skip(self, campaign_ids), fields(campaigns = campaign_ids.len()))]
    async fn total_engagements(
        &self,
        campaign_ids: &[String],
    ) -> Result<HashMap<String, f64>, MetricsError> {
        if campaign_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids = campaign_ids.to_vec();
        let scores = self
            .run_blocking(move |conn| {
                let placeholders = vec!["?"; ids.len()].join(",");
                let sql = format!(
                    "SELECT campaign_id, COALESCE(SUM(engagement_count), 0) FROM user_analytics \
                     WHERE campaign_id IN ({}) GROUP BY campaign_id",
                    placeholders
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params_from_iter(ids.iter()), |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
                })?;

                let mut scores: HashMap<String, f64> =
                    ids.iter().map(|id| (id.clone(), 0.0)).collect();
                for row in rows {
                    let (campaign_id, total) = row?;
                    scores.insert(campaign_id, total as f64);
                }
                Ok(scores)
            })
            .await?;

        debug!(campaigns = scores.len(), "Loaded engagement scores");
        Ok(scores)
    }
}

impl MetricsStore for SqliteMetricsStore {
    async fn is_ready(&self) -> bool {
        self.run_blocking(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map_err(MetricsError::from)
        })
        .await
        .is_ok()
    }

    async fn score_for(&self, campaign_id: &str) -> Result<f64, MetricsError> {
        self.total_engagement(campaign_id).await
    }

    async fn scores_for(&self, campaign_ids: &[String]) -> Result<HashMap<String, f64>, MetricsError> {
        self.total_engagements(campaign_ids).await
    }
}
