use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, info, instrument};

use recs::cache::RecommendationCache;
use recs::graph::RelationshipStore;
use recs::metrics::MetricsStore;
use recs::retrieval::RecommendationOutcome;
use recs::vectordb::SimilarityIndex;

use super::RECS_STATUS_HEADER;
use crate::gateway::error::GatewayError;
use crate::gateway::extract::UserIdPath;
use crate::gateway::state::HandlerState;

const MISSING_USER_ID: &str = "user_id must not be empty";

/// `GET /recommendations/{user_id}`
#[instrument(skip(state), fields(user_id = %user_id))]
pub async fn recommendations_handler<V, G, M, C>(
    State(state): State<HandlerState<V, G, M, C>>,
    UserIdPath(user_id): UserIdPath,
) -> Result<Response, GatewayError>
where
    V: SimilarityIndex + 'static,
    G: RelationshipStore + 'static,
    M: MetricsStore + 'static,
    C: RecommendationCache + 'static,
{
    debug!("Fetching recommendations");
    let outcome = state.orchestrator.get_recommendations(&user_id).await?;

    info!(
        source = %outcome.retrieval_source,
        recommendations = outcome.recommendations.len(),
        "Recommendations served"
    );
    Ok(make_response(outcome))
}

/// `GET /recommendations/` with nothing after the slash.
pub async fn missing_user_id_handler() -> GatewayError {
    GatewayError::InvalidRequest(MISSING_USER_ID.to_string())
}

fn make_response(outcome: RecommendationOutcome) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        RECS_STATUS_HEADER,
        HeaderValue::from_static(outcome.retrieval_source.as_str()),
    );

    (StatusCode::OK, headers, Json(outcome)).into_response()
}
