//! Test server harness.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use recs::cache::{MockCache, RecommendationCache};
use recs::config::RetrievalConfig;
use recs::graph::{MockRelationshipStore, RelationshipStore};
use recs::metrics::{MetricsStore, MockMetricsStore, SqliteMetricsStore};
use recs::model::SimilarityMatch;
use recs::retrieval::{MockOrchestrator, RetrievalOrchestrator};
use recs::vectordb::{MockSimilarityIndex, SimilarityIndex};
use recs_server::gateway::{HandlerState, create_router_with_state};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

pub type SqliteServerOrchestrator = RetrievalOrchestrator<
    MockSimilarityIndex,
    MockRelationshipStore,
    SqliteMetricsStore,
    MockCache,
>;

#[derive(Debug, Clone, Default)]
pub struct TestServerConfig {
    pub port: u16,
    pub retrieval: RetrievalConfig,
}

pub struct TestServer<O> {
    pub addr: SocketAddr,
    pub orchestrator: Arc<O>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    _temp_dir: Option<TempDir>,
}

impl<O> TestServer<O> {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl<O> Drop for TestServer<O> {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn find_available_port() -> std::io::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    Ok(addr.port())
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

/// Seeds the reference data set: `u_001` is closest to `u_002`..`u_004`, whose
/// campaigns give `c_101` (3), `c_102` (3) and `c_103` (1).
pub fn seed_reference_users(index: &MockSimilarityIndex, graph: &MockRelationshipStore) {
    for (i, user) in ["u_001", "u_002", "u_003", "u_004", "u_005"]
        .iter()
        .enumerate()
    {
        let mut v = vec![0.0_f32; 8];
        v[i] = 1.0;
        index.insert_user(user, v);
    }
    index.set_neighbors(
        "u_001",
        vec![
            SimilarityMatch::new("u_002", 0.93),
            SimilarityMatch::new("u_003", 0.91),
            SimilarityMatch::new("u_004", 0.88),
        ],
    );

    for user in ["u_002", "u_003", "u_004"] {
        graph.connect(user, "c_101");
        graph.connect(user, "c_102");
    }
    graph.connect("u_002", "c_103");
}

async fn serve<V, G, M, C>(
    port: u16,
    orchestrator: Arc<RetrievalOrchestrator<V, G, M, C>>,
    temp_dir: Option<TempDir>,
) -> Result<TestServer<RetrievalOrchestrator<V, G, M, C>>, ServerStartupError>
where
    V: SimilarityIndex + 'static,
    G: RelationshipStore + 'static,
    M: MetricsStore + 'static,
    C: RecommendationCache + 'static,
{
    let port = if port == 0 {
        find_available_port().await?
    } else {
        port
    };

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    let app = create_router_with_state(HandlerState::new(orchestrator.clone()));

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        orchestrator,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
        _temp_dir: temp_dir,
    })
}

/// Spawns a server whose stores are all in-memory mocks seeded with the reference users.
pub async fn spawn_test_server(
    config: TestServerConfig,
) -> Result<TestServer<MockOrchestrator>, ServerStartupError> {
    let index = MockSimilarityIndex::new();
    let graph = MockRelationshipStore::new();
    seed_reference_users(&index, &graph);

    let orchestrator = Arc::new(RetrievalOrchestrator::new(
        index,
        graph,
        MockMetricsStore::new(),
        MockCache::new(),
        config.retrieval,
    ));

    serve(config.port, orchestrator, None).await
}

/// Same as [`spawn_test_server`] but engagement comes from a real SQLite file.
///
/// `engagement` rows are `(user_id, campaign_id, engagement_count)`.
pub async fn spawn_sqlite_server(
    config: TestServerConfig,
    engagement: &[(&str, &str, i64)],
) -> Result<TestServer<SqliteServerOrchestrator>, ServerStartupError> {
    let temp_dir = TempDir::new().map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
    let metrics = SqliteMetricsStore::open(&temp_dir.path().join("analytics.db"))
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
    for (user, campaign, count) in engagement {
        metrics
            .upsert_engagement(user, campaign, *count)
            .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
    }

    let index = MockSimilarityIndex::new();
    let graph = MockRelationshipStore::new();
    seed_reference_users(&index, &graph);

    let orchestrator = Arc::new(RetrievalOrchestrator::new(
        index,
        graph,
        metrics,
        MockCache::new(),
        config.retrieval,
    ));

    serve(config.port, orchestrator, Some(temp_dir)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_available_port() {
        let port = find_available_port()
            .await
            .expect("Should find available port");
        assert!(port > 0);
    }

    #[tokio::test]
    async fn test_server_config_defaults() {
        let config = TestServerConfig::default();
        assert_eq!(config.port, 0);
        assert_eq!(config.retrieval, RetrievalConfig::default());
    }
}
