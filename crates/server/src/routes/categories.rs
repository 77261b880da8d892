use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::category::{Category, CategoryUpdate, CreateCategory, UpdateCategory};
use tracing::info;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, form::FormData, middleware::AdminSession};

/// GET /api/categories
pub async fn get_categories(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Category>>>, ApiError> {
    let categories = Category::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(categories)))
}

/// GET /api/categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Category>>, ApiError> {
    let category = Category::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound("Category"))?;
    Ok(ResponseJson(ApiResponse::success(category)))
}

/// POST /api/categories
pub async fn create_category(
    _session: AdminSession,
    State(state): State<AppState>,
    form: FormData,
) -> Result<ResponseJson<ApiResponse<Category>>, ApiError> {
    let name = form.required("name")?;
    let display_name = form.required("display_name")?;

    let category = Category::create(&state.db.pool, &CreateCategory { name, display_name }).await?;

    info!(category_id = category.id, name = %category.name, "Category created");
    state.content_changed("category_created").await;
    Ok(ResponseJson(ApiResponse::success(category)))
}

/// PUT /api/categories/{id}
/// Renaming a category also moves every portfolio item filed under the old name.
pub async fn update_category(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    form: FormData,
) -> Result<ResponseJson<ApiResponse<CategoryUpdate>>, ApiError> {
    let update = Category::update_with_cascade(
        &state.db.pool,
        id,
        &UpdateCategory {
            name: form.text("name"),
            display_name: form.text("display_name"),
        },
    )
    .await?
    .ok_or(ApiError::NotFound("Category"))?;

    info!(
        category_id = id,
        updated_projects = update.updated_projects,
        "Category updated"
    );
    state.content_changed("category_updated").await;
    Ok(ResponseJson(ApiResponse::success(update)))
}

/// DELETE /api/categories/{id}
/// Portfolio items keep their category key
pub async fn delete_category(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    if Category::delete(&state.db.pool, id).await? == 0 {
        return Err(ApiError::NotFound("Category"));
    }

    info!(category_id = id, "Category deleted");
    state.content_changed("category_deleted").await;
    Ok(ResponseJson(ApiResponse::success_with_message((), "Category deleted")))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/categories",
        Router::new()
            .route("/", get(get_categories).post(create_category))
            .route(
                "/{id}",
                get(get_category).put(update_category).delete(delete_category),
            ),
    )
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let app = TestApp::new().await;
        let token = app.token().await;

        let (status, _) = app
            .post_json(
                "/api/categories",
                Some(&token),
                json!({ "name": "branding", "displayName": "Branding" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = app
            .post_json(
                "/api/categories",
                Some(&token),
                json!({ "name": "branding", "display_name": "Branding again" }),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);

        let (status, body) = app
            .post_json("/api/categories", Some(&token), json!({ "name": "print" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "display_name is required");
    }

    #[tokio::test]
    async fn test_rename_moves_portfolio_items() {
        let app = TestApp::new().await;
        let token = app.token().await;

        let (_, body) = app
            .post_json(
                "/api/portfolio-projects",
                Some(&token),
                json!({ "title": "Fundo", "category": "Web Design", "filterCategory": "web design" }),
            )
            .await;
        let project_id = body["data"]["id"].as_i64().unwrap();

        let (_, body) = app.get("/api/categories").await;
        let category_id = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["name"] == "web design")
            .unwrap()["id"]
            .as_i64()
            .unwrap();

        let (status, body) = app
            .put_json(
                &format!("/api/categories/{category_id}"),
                Some(&token),
                json!({ "name": "ui design", "displayName": "UI Design" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["category"]["displayName"], "UI Design");
        assert_eq!(body["data"]["updatedProjects"], 1);

        let (_, body) = app
            .get(&format!("/api/portfolio-projects/{project_id}"))
            .await;
        assert_eq!(body["data"]["filterCategory"], "ui design");

        let page = app.page();
        assert!(page.contains(r#"data-category="ui design""#));
        assert!(page.contains("UI Design"));
    }

    #[tokio::test]
    async fn test_missing_category() {
        let app = TestApp::new().await;
        let token = app.token().await;

        let (status, _) = app
            .put_json("/api/categories/999", Some(&token), json!({ "name": "x" }))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app.delete("/api/categories/999", Some(&token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
