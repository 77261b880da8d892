use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::social_link::{CreateSocialLink, SocialLink, UpdateSocialLink};
use tracing::info;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, form::FormData, middleware::AdminSession};

/// GET /api/social-links
pub async fn get_social_links(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<SocialLink>>>, ApiError> {
    let links = SocialLink::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(links)))
}

/// GET /api/social-links/{id}
pub async fn get_social_link(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<SocialLink>>, ApiError> {
    let link = SocialLink::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound("Social link"))?;
    Ok(ResponseJson(ApiResponse::success(link)))
}

/// POST /api/social-links
pub async fn create_social_link(
    _session: AdminSession,
    State(state): State<AppState>,
    form: FormData,
) -> Result<ResponseJson<ApiResponse<SocialLink>>, ApiError> {
    let link = SocialLink::create(
        &state.db.pool,
        &CreateSocialLink {
            name: form.required("name")?,
            icon: form.required("icon")?,
            url: form.required("url")?,
        },
    )
    .await?;

    info!(social_link_id = link.id, name = %link.name, "Social link created");
    state.content_changed("social_link_created").await;
    Ok(ResponseJson(ApiResponse::success(link)))
}

/// PUT /api/social-links/{id}
pub async fn update_social_link(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    form: FormData,
) -> Result<ResponseJson<ApiResponse<SocialLink>>, ApiError> {
    let link = SocialLink::update(
        &state.db.pool,
        id,
        &UpdateSocialLink {
            name: form.text("name"),
            icon: form.text("icon"),
            url: form.text("url"),
        },
    )
    .await?
    .ok_or(ApiError::NotFound("Social link"))?;

    info!(social_link_id = id, "Social link updated");
    state.content_changed("social_link_updated").await;
    Ok(ResponseJson(ApiResponse::success(link)))
}

/// DELETE /api/social-links/{id}
pub async fn delete_social_link(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    if SocialLink::delete(&state.db.pool, id).await? == 0 {
        return Err(ApiError::NotFound("Social link"));
    }

    info!(social_link_id = id, "Social link deleted");
    state.content_changed("social_link_deleted").await;
    Ok(ResponseJson(ApiResponse::success_with_message((), "Social link deleted")))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/social-links",
        Router::new()
            .route("/", get(get_social_links).post(create_social_link))
            .route(
                "/{id}",
                get(get_social_link)
                    .put(update_social_link)
                    .delete(delete_social_link),
            ),
    )
}
