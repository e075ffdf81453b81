use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use recs::retrieval::RetrievalError;

use super::RECS_STATUS_HEADER;

const INTERNAL_ERROR_MESSAGE: &str = "failed to retrieve recommendations";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    /// Carries the store failure for logging; never sent to the client.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<RetrievalError> for GatewayError {
    fn from(err: RetrievalError) -> Self {
        match err {
            RetrievalError::InvalidRequest(msg) => GatewayError::InvalidRequest(msg),
            RetrievalError::UserNotFound { user_id } => GatewayError::UserNotFound(user_id),
            err @ RetrievalError::StoreUnavailable { .. } => {
                GatewayError::StoreUnavailable(err.to_string())
            }
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, error_message, recs_status) = match &self {
            GatewayError::InvalidRequest(_) => {
                (StatusCode::BAD_REQUEST, self.to_string(), "invalid_request")
            }
            GatewayError::UserNotFound(_) => {
                (StatusCode::NOT_FOUND, self.to_string(), "not_found")
            }
            GatewayError::StoreUnavailable(detail) => {
                error!(error = %detail, "Recommendation retrieval failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                    "store_error",
                )
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert(RECS_STATUS_HEADER, HeaderValue::from_static(recs_status));

        let body = Json(ErrorResponse {
            error: error_message,
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
