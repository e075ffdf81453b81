//! Hybrid recommendation server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use recs::cache::CacheBackend;
use recs::config::Config;
use recs::constants::DimConfig;
use recs::graph::Neo4jStore;
use recs::metrics::SqliteMetricsStore;
use recs::retrieval::RetrievalOrchestrator;
use recs::vectordb::QdrantIndex;
use recs_server::gateway::{HandlerState, create_router_with_state};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check().await);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        similarity_k = config.retrieval.similarity_k,
        cache_ttl_secs = config.retrieval.cache_ttl.as_secs(),
        "Recommendation service starting"
    );

    let index = QdrantIndex::new(
        &config.qdrant_url,
        &config.qdrant_collection,
        DimConfig::new(config.retrieval.embedding_dim),
    )?;
    tracing::info!(
        url = index.url(),
        collection = index.collection(),
        "Similarity index configured"
    );
    if let Err(e) = index.health_check().await {
        tracing::warn!("Qdrant not reachable yet: {}. Requests will fail until it is.", e);
    }

    let graph =
        Neo4jStore::connect(&config.neo4j_uri, &config.neo4j_user, &config.neo4j_password).await?;
    tracing::info!(uri = %config.neo4j_uri, "Connected to Neo4j");

    let metrics = SqliteMetricsStore::open(&config.sqlite_path)?;
    tracing::info!(path = %config.sqlite_path.display(), "Opened metrics database");

    let cache = CacheBackend::from_config(config.redis_url.as_deref(), config.cache_capacity).await?;

    let orchestrator = Arc::new(RetrievalOrchestrator::new(
        index,
        graph,
        metrics,
        cache,
        config.retrieval.clone(),
    ));

    let app = create_router_with_state(HandlerState::new(orchestrator));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn run_health_check() -> i32 {
    let port = std::env::var(Config::ENV_PORT)
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    {
        Ok(client) => client,
        Err(_) => return 1,
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
