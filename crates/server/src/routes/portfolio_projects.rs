use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::portfolio_project::{
    CreatePortfolioProject, PortfolioProject, UpdatePortfolioProject,
};
use serde::Deserialize;
use services::services::uploads::UploadKind;
use tracing::info;
use utils::response::ApiResponse;

use super::RequestUploads;
use crate::{AppState, error::ApiError, form::FormData, middleware::AdminSession};

#[derive(Debug, Default, Deserialize)]
pub struct PortfolioQuery {
    /// Category key; only items filed under it are returned.
    pub category: Option<String>,
}

/// GET /api/portfolio-projects?category={key}
pub async fn get_portfolio_projects(
    State(state): State<AppState>,
    Query(query): Query<PortfolioQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<PortfolioProject>>>, ApiError> {
    let projects = match query.category.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => {
            PortfolioProject::find_by_filter_category(&state.db.pool, key).await?
        }
        _ => PortfolioProject::find_all(&state.db.pool).await?,
    };
    Ok(ResponseJson(ApiResponse::success(projects)))
}

/// GET /api/portfolio-projects/{id}
pub async fn get_portfolio_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<PortfolioProject>>, ApiError> {
    let project = PortfolioProject::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound("Portfolio project"))?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

/// POST /api/portfolio-projects
pub async fn create_portfolio_project(
    _session: AdminSession,
    State(state): State<AppState>,
    form: FormData,
) -> Result<ResponseJson<ApiResponse<PortfolioProject>>, ApiError> {
    let title = form.required("title")?;
    let category = form.required("category")?;
    let filter_category = form
        .text("filter_category")
        .unwrap_or_else(|| category.clone());
    let mut uploads = RequestUploads::default();
    let image = uploads.file_or_text(&state, &form, "image", UploadKind::Image).await?;

    let created = PortfolioProject::create(
        &state.db.pool,
        &CreatePortfolioProject {
            title,
            category,
            image,
            description: form.text("description"),
            repo_link: Some(form.text("repo_link").unwrap_or_default()),
            live_link: Some(form.text("live_link").unwrap_or_default()),
            filter_category: Some(filter_category),
        },
    )
    .await
    .map_err(ApiError::from);
    let project = uploads.settle(&state, created).await?;

    info!(portfolio_project_id = project.id, "Portfolio project created");
    state.content_changed("portfolio_project_created").await;
    Ok(ResponseJson(ApiResponse::success(project)))
}

/// PUT /api/portfolio-projects/{id}
pub async fn update_portfolio_project(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    form: FormData,
) -> Result<ResponseJson<ApiResponse<PortfolioProject>>, ApiError> {
    if PortfolioProject::find_by_id(&state.db.pool, id).await?.is_none() {
        return Err(ApiError::NotFound("Portfolio project"));
    }
    let mut uploads = RequestUploads::default();
    let image = uploads.file_or_text(&state, &form, "image", UploadKind::Image).await?;

    let updated = PortfolioProject::update(
        &state.db.pool,
        id,
        &UpdatePortfolioProject {
            title: form.text("title"),
            category: form.text("category"),
            image,
            description: form.text("description"),
            repo_link: form.text("repo_link"),
            live_link: form.text("live_link"),
            filter_category: form.text("filter_category"),
        },
    )
    .await
    .map_err(ApiError::from)
    .and_then(|row| row.ok_or(ApiError::NotFound("Portfolio project")));
    let project = uploads.settle(&state, updated).await?;

    info!(portfolio_project_id = id, "Portfolio project updated");
    state.content_changed("portfolio_project_updated").await;
    Ok(ResponseJson(ApiResponse::success(project)))
}

/// DELETE /api/portfolio-projects/{id}
pub async fn delete_portfolio_project(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    if PortfolioProject::delete(&state.db.pool, id).await? == 0 {
        return Err(ApiError::NotFound("Portfolio project"));
    }

    info!(portfolio_project_id = id, "Portfolio project deleted");
    state.content_changed("portfolio_project_deleted").await;
    Ok(ResponseJson(ApiResponse::success_with_message(
        (),
        "Portfolio project deleted",
    )))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/portfolio-projects",
        Router::new()
            .route("/", get(get_portfolio_projects).post(create_portfolio_project))
            .route(
                "/{id}",
                get(get_portfolio_project)
                    .put(update_portfolio_project)
                    .delete(delete_portfolio_project),
            ),
    )
}
