use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::education::{CreateEducation, Education, UpdateEducation};
use tracing::info;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, form::FormData, middleware::AdminSession};

/// GET /api/education
pub async fn get_education_entries(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Education>>>, ApiError> {
    let entries = Education::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(entries)))
}

/// GET /api/education/{id}
pub async fn get_education_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Education>>, ApiError> {
    let entry = Education::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound("Education entry"))?;
    Ok(ResponseJson(ApiResponse::success(entry)))
}

/// POST /api/education
pub async fn create_education_entry(
    _session: AdminSession,
    State(state): State<AppState>,
    form: FormData,
) -> Result<ResponseJson<ApiResponse<Education>>, ApiError> {
    let entry = Education::create(
        &state.db.pool,
        &CreateEducation {
            institution: form.required("institution")?,
            period: form.required("period")?,
            description: form.text("description"),
        },
    )
    .await?;

    info!(education_id = entry.id, "Education entry created");
    state.content_changed("education_created").await;
    Ok(ResponseJson(ApiResponse::success(entry)))
}

/// PUT /api/education/{id}
pub async fn update_education_entry(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    form: FormData,
) -> Result<ResponseJson<ApiResponse<Education>>, ApiError> {
    let entry = Education::update(
        &state.db.pool,
        id,
        &UpdateEducation {
            institution: form.text("institution"),
            period: form.text("period"),
            description: form.text("description"),
        },
    )
    .await?
    .ok_or(ApiError::NotFound("Education entry"))?;

    info!(education_id = id, "Education entry updated");
    state.content_changed("education_updated").await;
    Ok(ResponseJson(ApiResponse::success(entry)))
}

/// DELETE /api/education/{id}
pub async fn delete_education_entry(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    if Education::delete(&state.db.pool, id).await? == 0 {
        return Err(ApiError::NotFound("Education entry"));
    }

    info!(education_id = id, "Education entry deleted");
    state.content_changed("education_deleted").await;
    Ok(ResponseJson(ApiResponse::success_with_message((), "Education entry deleted")))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/education",
        Router::new()
            .route("/", get(get_education_entries).post(create_education_entry))
            .route(
                "/{id}",
                get(get_education_entry)
                    .put(update_education_entry)
                    .delete(delete_education_entry),
            ),
    )
}
