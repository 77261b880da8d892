use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::skill::{CreateSkill, Skill, UpdateSkill};
use tracing::info;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, form::FormData, middleware::AdminSession};

fn percentage(form: &FormData) -> Result<Option<i64>, ApiError> {
    match form.int("percentage")? {
        Some(value) if !(0..=100).contains(&value) => Err(ApiError::BadRequest(
            "percentage must be between 0 and 100".into(),
        )),
        other => Ok(other),
    }
}

/// GET /api/skills
pub async fn get_skills(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Skill>>>, ApiError> {
    let skills = Skill::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(skills)))
}

/// GET /api/skills/{id}
pub async fn get_skill(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Skill>>, ApiError> {
    let skill = Skill::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound("Skill"))?;
    Ok(ResponseJson(ApiResponse::success(skill)))
}

/// POST /api/skills
pub async fn create_skill(
    _session: AdminSession,
    State(state): State<AppState>,
    form: FormData,
) -> Result<ResponseJson<ApiResponse<Skill>>, ApiError> {
    let name = form.required("name")?;
    let percentage = percentage(&form)?.ok_or_else(|| ApiError::missing_field("percentage"))?;

    let skill = Skill::create(&state.db.pool, &CreateSkill { name, percentage }).await?;

    info!(skill_id = skill.id, "Skill created");
    state.content_changed("skill_created").await;
    Ok(ResponseJson(ApiResponse::success(skill)))
}

/// PUT /api/skills/{id}
/// Percentage stays unchanged when omitted
pub async fn update_skill(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    form: FormData,
) -> Result<ResponseJson<ApiResponse<Skill>>, ApiError> {
    if Skill::find_by_id(&state.db.pool, id).await?.is_none() {
        return Err(ApiError::NotFound("Skill"));
    }

    let skill = Skill::update(
        &state.db.pool,
        id,
        &UpdateSkill {
            name: form.text("name"),
            percentage: percentage(&form)?,
        },
    )
    .await?
    .ok_or(ApiError::NotFound("Skill"))?;

    info!(skill_id = id, "Skill updated");
    state.content_changed("skill_updated").await;
    Ok(ResponseJson(ApiResponse::success(skill)))
}

/// DELETE /api/skills/{id}
pub async fn delete_skill(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    if Skill::delete(&state.db.pool, id).await? == 0 {
        return Err(ApiError::NotFound("Skill"));
    }

    info!(skill_id = id, "Skill deleted");
    state.content_changed("skill_deleted").await;
    Ok(ResponseJson(ApiResponse::success_with_message((), "Skill deleted")))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/skills",
        Router::new()
            .route("/", get(get_skills).post(create_skill))
            .route("/{id}", get(get_skill).put(update_skill).delete(delete_skill)),
    )
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn test_percentage_bounds() {
        let app = TestApp::new().await;
        let token = app.token().await;

        for bad in [json!(101), json!(-1), json!("ninety")] {
            let (status, _) = app
                .post_json("/api/skills", Some(&token), json!({ "name": "Rust", "percentage": bad }))
                .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }

        let (status, body) = app
            .post_json("/api/skills", Some(&token), json!({ "name": "Rust", "percentage": "100" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["percentage"], 100);
        assert!(app.page().contains(r#"<data value="100">100%</data>"#));

        let (status, body) = app
            .post_json("/api/skills", Some(&token), json!({ "name": "Go" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "percentage is required");
    }

    #[tokio::test]
    async fn test_partial_update_keeps_percentage() {
        let app = TestApp::new().await;
        let token = app.token().await;

        let (_, body) = app
            .post_json("/api/skills", Some(&token), json!({ "name": "Rust", "percentage": 60 }))
            .await;
        let id = body["data"]["id"].as_i64().unwrap();

        let (status, body) = app
            .put_json(&format!("/api/skills/{id}"), Some(&token), json!({ "name": "Rust 2024" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["percentage"], 60);
        assert_eq!(body["data"]["name"], "Rust 2024");
    }
}
