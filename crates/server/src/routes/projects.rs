use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::project::{CreateProject, Project, UpdateProject};
use services::services::uploads::UploadKind;
use tracing::info;
use utils::response::ApiResponse;

use super::RequestUploads;
use crate::{AppState, error::ApiError, form::FormData, middleware::AdminSession};

/// GET /api/projects
pub async fn get_projects(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Project>>>, ApiError> {
    let projects = Project::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(projects)))
}

/// GET /api/projects/{id}
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    let project = Project::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound("Project"))?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

/// POST /api/projects
pub async fn create_project(
    _session: AdminSession,
    State(state): State<AppState>,
    form: FormData,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    let title = form.required("title")?;
    let category = form.required("category")?;
    let mut uploads = RequestUploads::default();
    let image = uploads.file_or_text(&state, &form, "image", UploadKind::Image).await?;

    let created = Project::create(
        &state.db.pool,
        &CreateProject {
            title,
            category,
            image,
            description: form.text("description"),
        },
    )
    .await
    .map_err(ApiError::from);
    let project = uploads.settle(&state, created).await?;

    info!(project_id = project.id, "Project created");
    state.content_changed("project_created").await;
    Ok(ResponseJson(ApiResponse::success(project)))
}

/// PUT /api/projects/{id}
pub async fn update_project(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    form: FormData,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    if Project::find_by_id(&state.db.pool, id).await?.is_none() {
        return Err(ApiError::NotFound("Project"));
    }
    let mut uploads = RequestUploads::default();
    let image = uploads.file_or_text(&state, &form, "image", UploadKind::Image).await?;

    let updated = Project::update(
        &state.db.pool,
        id,
        &UpdateProject {
            title: form.text("title"),
            category: form.text("category"),
            image,
            description: form.text("description"),
        },
    )
    .await
    .map_err(ApiError::from)
    .and_then(|row| row.ok_or(ApiError::NotFound("Project")));
    let project = uploads.settle(&state, updated).await?;

    info!(project_id = id, "Project updated");
    state.content_changed("project_updated").await;
    Ok(ResponseJson(ApiResponse::success(project)))
}

/// DELETE /api/projects/{id}
pub async fn delete_project(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    if Project::delete(&state.db.pool, id).await? == 0 {
        return Err(ApiError::NotFound("Project"));
    }

    info!(project_id = id, "Project deleted");
    state.content_changed("project_deleted").await;
    Ok(ResponseJson(ApiResponse::success_with_message((), "Project deleted")))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/projects",
        Router::new()
            .route("/", get(get_projects).post(create_project))
            .route(
                "/{id}",
                get(get_project).put(update_project).delete(delete_project),
            ),
    )
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn test_project_crud() {
        let app = TestApp::new().await;
        let token = app.token().await;

        let (status, body) = app
            .post_json(
                "/api/projects",
                Some(&token),
                json!({ "title": "Branding", "category": "design" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let id = body["data"]["id"].as_i64().unwrap();

        let (status, body) = app
            .put_json(
                &format!("/api/projects/{id}"),
                Some(&token),
                json!({ "description": "Logos", "title": "" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["title"], "Branding");
        assert_eq!(body["data"]["description"], "Logos");

        let page = app.page();
        assert!(page.contains("Branding"));

        let (status, _) = app.delete(&format!("/api/projects/{id}"), Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = app.get(&format!("/api/projects/{id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app.delete(&format!("/api/projects/{id}"), Some(&token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_requires_fields_and_auth() {
        let app = TestApp::new().await;

        let (status, _) = app
            .post_json("/api/projects", None, json!({ "title": "x", "category": "y" }))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app
            .post_json("/api/projects", Some("garbage"), json!({ "title": "x", "category": "y" }))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let token = app.token().await;
        let (status, body) = app
            .post_json("/api/projects", Some(&token), json!({ "title": "x", "category": "  " }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "category is required");
    }

    #[tokio::test]
    async fn test_update_missing_project_is_not_found() {
        let app = TestApp::new().await;
        let token = app.token().await;
        let (status, _) = app
            .put_json("/api/projects/999", Some(&token), json!({ "title": "x" }))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
