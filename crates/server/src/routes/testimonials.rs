use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::testimonial::{
    CreateTestimonial, DEFAULT_AVATAR, Testimonial, UpdateTestimonial,
};
use services::services::uploads::UploadKind;
use tracing::info;
use utils::{response::ApiResponse, text::today};

use super::RequestUploads;
use crate::{AppState, error::ApiError, form::FormData, middleware::AdminSession};

/// GET /api/testimonials
pub async fn get_testimonials(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Testimonial>>>, ApiError> {
    let testimonials = Testimonial::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(testimonials)))
}

/// GET /api/testimonials/{id}
pub async fn get_testimonial(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Testimonial>>, ApiError> {
    let testimonial = Testimonial::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound("Testimonial"))?;
    Ok(ResponseJson(ApiResponse::success(testimonial)))
}

/// POST /api/testimonials
/// Avatar defaults to the stock image, date to today
pub async fn create_testimonial(
    _session: AdminSession,
    State(state): State<AppState>,
    form: FormData,
) -> Result<ResponseJson<ApiResponse<Testimonial>>, ApiError> {
    let name = form.required("name")?;
    let text = form.required("text")?;
    let mut uploads = RequestUploads::default();
    let avatar = uploads.file_or_text(&state, &form, "avatar", UploadKind::Image)
        .await?
        .unwrap_or_else(|| DEFAULT_AVATAR.to_string());

    let created = Testimonial::create(
        &state.db.pool,
        &CreateTestimonial {
            name,
            text,
            avatar: Some(avatar),
            date: Some(form.text("date").unwrap_or_else(today)),
        },
    )
    .await
    .map_err(ApiError::from);
    let testimonial = uploads.settle(&state, created).await?;

    info!(testimonial_id = testimonial.id, "Testimonial created");
    state.content_changed("testimonial_created").await;
    Ok(ResponseJson(ApiResponse::success(testimonial)))
}

/// PUT /api/testimonials/{id}
pub async fn update_testimonial(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    form: FormData,
) -> Result<ResponseJson<ApiResponse<Testimonial>>, ApiError> {
    if Testimonial::find_by_id(&state.db.pool, id).await?.is_none() {
        return Err(ApiError::NotFound("Testimonial"));
    }
    let mut uploads = RequestUploads::default();
    let avatar = uploads.file_or_text(&state, &form, "avatar", UploadKind::Image).await?;

    let updated = Testimonial::update(
        &state.db.pool,
        id,
        &UpdateTestimonial {
            name: form.text("name"),
            text: form.text("text"),
            avatar,
            date: form.text("date"),
        },
    )
    .await
    .map_err(ApiError::from)
    .and_then(|row| row.ok_or(ApiError::NotFound("Testimonial")));
    let testimonial = uploads.settle(&state, updated).await?;

    info!(testimonial_id = id, "Testimonial updated");
    state.content_changed("testimonial_updated").await;
    Ok(ResponseJson(ApiResponse::success(testimonial)))
}

/// DELETE /api/testimonials/{id}
pub async fn delete_testimonial(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    if Testimonial::delete(&state.db.pool, id).await? == 0 {
        return Err(ApiError::NotFound("Testimonial"));
    }

    info!(testimonial_id = id, "Testimonial deleted");
    state.content_changed("testimonial_deleted").await;
    Ok(ResponseJson(ApiResponse::success_with_message((), "Testimonial deleted")))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/testimonials",
        Router::new()
            .route("/", get(get_testimonials).post(create_testimonial))
            .route(
                "/{id}",
                get(get_testimonial)
                    .put(update_testimonial)
                    .delete(delete_testimonial),
            ),
    )
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use utils::text::today;

    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn test_create_fills_avatar_and_date() {
        let app = TestApp::new().await;
        let token = app.token().await;

        let (status, body) = app
            .post_json(
                "/api/testimonials",
                Some(&token),
                json!({ "name": "Jessica Miller", "text": "Great <b>work</b>" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["avatar"], "./assets/images/avatar-default.png");
        assert_eq!(body["data"]["date"], today());

        let page = app.page();
        assert!(page.contains("Jessica Miller"));
        assert!(page.contains("Great &lt;b&gt;work&lt;/b&gt;"));
    }

    #[tokio::test]
    async fn test_list_includes_seeded_testimonial() {
        let app = TestApp::new().await;
        let (status, body) = app.get("/api/testimonials").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["name"], "Daniel Lewis");
    }
}
