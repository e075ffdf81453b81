//! Router-level tests for the recommendation gateway.

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, body::Body, http::Request, http::StatusCode, response::IntoResponse};
use http_body_util::BodyExt;
use tower::ServiceExt;

use recs::config::RetrievalConfig;
use recs::model::SimilarityMatch;
use recs::retrieval::{MockOrchestrator, RetrievalError, StoreFailure, StoreKind};

use crate::gateway::error::{ErrorResponse, GatewayError};
use crate::gateway::state::HandlerState;
use crate::gateway::{
    HealthResponse, PROCESS_TIME_HEADER, RECS_STATUS_HEADER, ReadyResponse, RootResponse,
    create_router_with_state,
};

fn seeded_orchestrator() -> Arc<MockOrchestrator> {
    let orch = MockOrchestrator::new_mock(RetrievalConfig::default());

    for (i, user) in ["u_001", "u_002", "u_003", "u_004"].iter().enumerate() {
        let mut v = vec![0.0_f32; 4];
        v[i] = 1.0;
        orch.index().insert_user(user, v);
    }
    orch.index().set_neighbors(
        "u_001",
        vec![
            SimilarityMatch::new("u_002", 0.9),
            SimilarityMatch::new("u_003", 0.8),
            SimilarityMatch::new("u_004", 0.7),
        ],
    );
    for user in ["u_002", "u_003", "u_004"] {
        orch.graph().connect(user, "c_101");
        orch.graph().connect(user, "c_102");
    }
    orch.graph().connect("u_004", "c_103");

    Arc::new(orch)
}

fn router_for(orch: Arc<MockOrchestrator>) -> Router {
    create_router_with_state(HandlerState::new(orch))
}

async fn get(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn status_header(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(RECS_STATUS_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("")
}

#[tokio::test]
async fn test_recommendations_computed_then_cached() {
    let orch = seeded_orchestrator();
    let app = router_for(orch.clone());

    let first = get(app.clone(), "/recommendations/u_001").await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(status_header(&first), "computed");
    let first = body_json(first).await;

    assert_eq!(first["user_id"], "u_001");
    assert_eq!(first["retrieval_source"], "computed");
    let recs = first["recommendations"].as_array().unwrap();
    let ids: Vec<&str> = recs
        .iter()
        .map(|r| r["campaign_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["c_101", "c_102", "c_103"]);
    assert_eq!(recs[0]["ranking_score"], 3);
    assert_eq!(recs[2]["ranking_score"], 1);
    assert_eq!(
        recs[0]["reason"],
        "Recommended based on users with similar interests."
    );

    let second = get(app, "/recommendations/u_001").await;
    assert_eq!(status_header(&second), "cache");
    let second = body_json(second).await;
    assert_eq!(second["retrieval_source"], "cache");
    assert_eq!(second["recommendations"], first["recommendations"]);
}

#[tokio::test]
async fn test_unknown_user_is_404() {
    let app = router_for(seeded_orchestrator());
    let response = get(app, "/recommendations/u_nobody").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(status_header(&response), "not_found");
    let body = body_json(response).await;
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn test_malformed_user_id_is_400_without_store_calls() {
    let orch = seeded_orchestrator();
    let app = router_for(orch.clone());

    let too_long = format!("/recommendations/{}", "x".repeat(101));
    let response = get(app.clone(), &too_long).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(status_header(&response), "invalid_request");

    let response = get(app, "/recommendations/u%0A001").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(orch.index().total_calls(), 0);
    assert_eq!(orch.cache().get_calls(), 0);
}

#[tokio::test]
async fn test_empty_user_id_is_400_json() {
    let orch = seeded_orchestrator();
    let app = router_for(orch.clone());

    let response = get(app, "/recommendations/").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(status_header(&response), "invalid_request");
    let body: ErrorResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(body.code, 400);
    assert!(body.error.contains("empty"));

    assert_eq!(orch.index().total_calls(), 0);
    assert_eq!(orch.cache().get_calls(), 0);
}

#[tokio::test]
async fn test_undecodable_path_is_400_json() {
    let orch = seeded_orchestrator();
    let app = router_for(orch.clone());

    let response = get(app, "/recommendations/u_%FF").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(status_header(&response), "invalid_request");
    let body: ErrorResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(body.code, 400);

    assert_eq!(orch.cache().get_calls(), 0);
}

#[tokio::test]
async fn test_store_failure_is_generic_500() {
    let orch = seeded_orchestrator();
    orch.graph().set_failing(true);
    let app = router_for(orch.clone());

    let response = get(app, "/recommendations/u_001").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(status_header(&response), "store_error");

    let body = body_json(response).await;
    let message = body["error"].as_str().unwrap();
    assert!(!message.contains("injected"));
    assert!(!message.contains("relationship_store"));
    assert_eq!(orch.cache().set_calls(), 0);
}

#[tokio::test]
async fn test_responses_carry_process_time() {
    let app = router_for(seeded_orchestrator());
    let response = get(app, "/healthz").await;

    let value = response
        .headers()
        .get(PROCESS_TIME_HEADER)
        .expect("latency header")
        .to_str()
        .unwrap();
    assert!(value.parse::<f64>().unwrap() >= 0.0);
}

#[tokio::test]
async fn test_health_and_root() {
    let app = router_for(seeded_orchestrator());

    let response = get(app.clone(), "/healthz").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(status_header(&response), "healthy");
    let body: HealthResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(body.status, "ok");

    let response = get(app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: RootResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert!(body.message.contains("/recommendations/"));
}

#[tokio::test]
async fn test_ready_reports_pending_store() {
    let orch = seeded_orchestrator();
    let app = router_for(orch.clone());

    let response = get(app.clone(), "/ready").await;
    assert_eq!(response.status(), StatusCode::OK);

    orch.metrics().set_failing(true);
    let response = get(app, "/ready").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: ReadyResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(body.status, "pending");
    assert_eq!(body.components.metrics_store, "pending");
    assert_eq!(body.components.similarity_index, "ready");
}

#[tokio::test]
async fn test_gateway_error_mapping() {
    let err: GatewayError = RetrievalError::UserNotFound {
        user_id: "u_9".to_string(),
    }
    .into();
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

    let err: GatewayError = RetrievalError::StoreUnavailable {
        store: StoreKind::SimilarityIndex,
        source: StoreFailure::Timeout(Duration::from_secs(2)),
    }
    .into();
    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.code, 500);
    assert!(!body.error.contains("timed out"));
}
