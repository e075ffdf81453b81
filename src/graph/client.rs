use neo4rs::{Graph, query};
use tracing::{debug, instrument};

use super::error::GraphError;
use crate::model::CampaignConnection;

/// Counts, per campaign, how many of the given users participated in it.
const CAMPAIGNS_FOR_USERS: &str = r#"
    MATCH (u:User)-[:PARTICIPATED_IN]->(c:Campaign)
    WHERE u.id IN $user_ids
    RETURN c.id AS campaign_id, count(DISTINCT u) AS connections
"#;

/// Read-side interface to the user → campaign relationship graph.
pub trait RelationshipStore: Send + Sync {
    /// Returns `true` if the store is reachable.
    fn is_ready(&self) -> impl std::future::Future<Output = bool> + Send;

    /// Returns every campaign connected to at least one of `user_ids`, with the
    /// number of distinct users connected to it. Order is unspecified.
    fn campaigns_for(
        &self,
        user_ids: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<CampaignConnection>, GraphError>> + Send;
}

/// Neo4j-backed relationship store.
#[derive(Clone)]
pub struct Neo4jStore {
    graph: Graph,
}

impl Neo4jStore {
    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self, GraphError> {
        let graph = Graph::new(uri, user, password)
            .await
            .map_err(|e| GraphError::ConnectionFailed {
                uri: uri.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self { graph })
    }

    /// Health check - verify Neo4j answers a trivial query.
    pub async fn health_check(&self) -> Result<bool, GraphError> {
        let mut result = self
            .graph
            .execute(query("RETURN 1 AS health"))
            .await
            .map_err(query_failed)?;

        match result.next().await.map_err(query_failed)? {
            Some(row) => Ok(row.get::<i64>("health").unwrap_or(0) == 1),
            None => Ok(false),
        }
    }

    #[instrument(skip(self, user_ids), fields(users = user_ids.len()))]
    async fn query_campaigns(
        &self,
        user_ids: &[String],
    ) -> Result<Vec<CampaignConnection>, GraphError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut result = self
            .graph
            .execute(query(CAMPAIGNS_FOR_USERS).param("user_ids", user_ids.to_vec()))
            .await
            .map_err(query_failed)?;

        let mut out = Vec::new();
        while let Some(row) = result.next().await.map_err(query_failed)? {
            let campaign_id: String = row
                .get("campaign_id")
                .map_err(|_| GraphError::InvalidRow {
                    field: "campaign_id",
                })?;
            let connections: i64 = row
                .get("connections")
                .map_err(|_| GraphError::InvalidRow {
                    field: "connections",
                })?;
            out.push(CampaignConnection::new(campaign_id, connections.max(0) as u64));
        }

        debug!(campaigns = out.len(), "Resolved connected campaigns");
        Ok(out)
    }
}

fn query_failed(e: neo4rs::Error) -> GraphError {
    GraphError::QueryFailed {
        message: e.to_string(),
    }
}

impl RelationshipStore for Neo4jStore {
    async fn is_ready(&self) -> bool {
        matches!(self.health_check().await, Ok(true))
    }

    async fn campaigns_for(&self, user_ids: &[String]) -> Result<Vec<CampaignConnection>, GraphError> {
        self.query_campaigns(user_ids).await
    }
}
