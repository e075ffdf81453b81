//! Path extraction that reports failures in the gateway's error shape.

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use recs::retrieval::validate_user_id;

use super::error::GatewayError;

/// The `{user_id}` path segment, decoded and validated.
#[derive(Debug, Clone)]
pub struct UserIdPath(pub String);

impl<S> FromRequestParts<S> for UserIdPath
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(user_id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| GatewayError::InvalidRequest(rejection.body_text()))?;

        validate_user_id(&user_id)?;
        Ok(Self(user_id))
    }
}
