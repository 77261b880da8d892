use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use services::services::auth::Claims;
use tracing::debug;

use crate::{AppState, error::ApiError};

/// A request carrying a valid admin bearer token.
///
/// Missing token rejects with 401, an invalid or expired one with 403.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub claims: Claims,
}

impl AdminSession {
    pub fn admin_id(&self) -> Result<i64, ApiError> {
        self.claims.sub.parse().map_err(|_| ApiError::Forbidden)
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(ApiError::Unauthorized)?;

        let claims = state.auth.verify_token(token).map_err(|e| {
            debug!(error = %e, "Rejected admin token");
            ApiError::Forbidden
        })?;

        Ok(Self { claims })
    }
}
