//! HTTP gateway (Axum) for recommendation retrieval.
//!
//! This module is primarily used by the `hybrid-recs` server binary.

#![allow(missing_docs)]

pub mod error;
pub mod extract;
pub mod handler;
pub mod latency;
pub mod state;

#[cfg(test)]
mod handler_tests;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;

pub use extract::UserIdPath;
pub use handler::{missing_user_id_handler, recommendations_handler};
pub use latency::{PROCESS_TIME_HEADER, record_latency};
pub use state::HandlerState;

use recs::cache::RecommendationCache;
use recs::graph::RelationshipStore;
use recs::metrics::MetricsStore;
use recs::vectordb::SimilarityIndex;

/// Response header describing how the request was served.
pub const RECS_STATUS_HEADER: &str = "X-Recs-Status";
pub const RECS_STATUS_HEALTHY: &str = "healthy";
pub const RECS_STATUS_READY: &str = "ready";
pub const RECS_STATUS_PENDING: &str = "pending";

const ROOT_MESSAGE: &str =
    "Recommendation API is running! Use GET /recommendations/{user_id} for recommendations.";

pub fn create_router_with_state<V, G, M, C>(state: HandlerState<V, G, M, C>) -> Router
where
    V: SimilarityIndex + 'static,
    G: RelationshipStore + 'static,
    M: MetricsStore + 'static,
    C: RecommendationCache + 'static,
{
    Router::new()
        .route("/", get(root_handler))
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler::<V, G, M, C>))
        .route("/recommendations/", get(missing_user_id_handler))
        .route(
            "/recommendations/{user_id}",
            get(recommendations_handler::<V, G, M, C>),
        )
        .layer(middleware::from_fn(record_latency))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct RootResponse {
    pub message: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct ReadyResponse {
    pub status: String,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct ComponentStatus {
    pub http: String,
    pub similarity_index: String,
    pub relationship_store: String,
    pub metrics_store: String,
    pub cache: String,
}

fn component_status(ready: bool) -> String {
    if ready {
        RECS_STATUS_READY.to_string()
    } else {
        RECS_STATUS_PENDING.to_string()
    }
}

pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: ROOT_MESSAGE.to_string(),
    })
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        RECS_STATUS_HEADER,
        HeaderValue::from_static(RECS_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse {
            status: "ok".to_string(),
        }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler<V, G, M, C>(State(state): State<HandlerState<V, G, M, C>>) -> Response
where
    V: SimilarityIndex + 'static,
    G: RelationshipStore + 'static,
    M: MetricsStore + 'static,
    C: RecommendationCache + 'static,
{
    let readiness = state.orchestrator.readiness().await;
    let is_ready = readiness.all_ready();

    let components = ComponentStatus {
        http: RECS_STATUS_READY.to_string(),
        similarity_index: component_status(readiness.similarity_index),
        relationship_store: component_status(readiness.relationship_store),
        metrics_store: component_status(readiness.metrics_store),
        cache: component_status(readiness.cache),
    };

    let status_code = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let status_msg = if is_ready { "ok" } else { RECS_STATUS_PENDING };

    let mut headers = HeaderMap::new();
    headers.insert(RECS_STATUS_HEADER, HeaderValue::from_static(status_msg));

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg.to_string(),
            components,
        }),
    )
        .into_response()
}
