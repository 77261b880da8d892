use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::experience::{CreateExperience, Experience, UpdateExperience};
use tracing::info;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, form::FormData, middleware::AdminSession};

/// GET /api/experience
pub async fn get_experience_entries(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Experience>>>, ApiError> {
    let entries = Experience::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(entries)))
}

/// GET /api/experience/{id}
pub async fn get_experience_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Experience>>, ApiError> {
    let entry = Experience::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound("Experience entry"))?;
    Ok(ResponseJson(ApiResponse::success(entry)))
}

/// POST /api/experience
pub async fn create_experience_entry(
    _session: AdminSession,
    State(state): State<AppState>,
    form: FormData,
) -> Result<ResponseJson<ApiResponse<Experience>>, ApiError> {
    let entry = Experience::create(
        &state.db.pool,
        &CreateExperience {
            position: form.required("position")?,
            period: form.required("period")?,
            description: form.text("description"),
        },
    )
    .await?;

    info!(experience_id = entry.id, "Experience entry created");
    state.content_changed("experience_created").await;
    Ok(ResponseJson(ApiResponse::success(entry)))
}

/// PUT /api/experience/{id}
pub async fn update_experience_entry(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    form: FormData,
) -> Result<ResponseJson<ApiResponse<Experience>>, ApiError> {
    let entry = Experience::update(
        &state.db.pool,
        id,
        &UpdateExperience {
            position: form.text("position"),
            period: form.text("period"),
            description: form.text("description"),
        },
    )
    .await?
    .ok_or(ApiError::NotFound("Experience entry"))?;

    info!(experience_id = id, "Experience entry updated");
    state.content_changed("experience_updated").await;
    Ok(ResponseJson(ApiResponse::success(entry)))
}

/// DELETE /api/experience/{id}
pub async fn delete_experience_entry(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    if Experience::delete(&state.db.pool, id).await? == 0 {
        return Err(ApiError::NotFound("Experience entry"));
    }

    info!(experience_id = id, "Experience entry deleted");
    state.content_changed("experience_deleted").await;
    Ok(ResponseJson(ApiResponse::success_with_message((), "Experience entry deleted")))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/experience",
        Router::new()
            .route("/", get(get_experience_entries).post(create_experience_entry))
            .route(
                "/{id}",
                get(get_experience_entry)
                    .put(update_experience_entry)
                    .delete(delete_experience_entry),
            ),
    )
}
