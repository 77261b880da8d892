use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    response::Json as ResponseJson,
    routing::get,
};
use serde::{Deserialize, Serialize};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct LastUpdateQuery {
    /// Unix millis the client last saw.
    pub since: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct LastUpdate {
    pub updated: bool,
    pub timestamp: i64,
}

/// GET /api/last-update?since={millis}
/// Polled by open pages to know when to reload.
pub async fn get_last_update(
    State(state): State<AppState>,
    query: Result<Query<LastUpdateQuery>, QueryRejection>,
) -> Result<ResponseJson<ApiResponse<LastUpdate>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let timestamp = state.last_update();
    let updated = query.since.is_some_and(|since| timestamp > since);
    Ok(ResponseJson(ApiResponse::success(LastUpdate {
        updated,
        timestamp,
    })))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/last-update", get(get_last_update))
}
