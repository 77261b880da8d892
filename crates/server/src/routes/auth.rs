use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    response::Json as ResponseJson,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use db::models::admin_user::AdminUser;
use serde::{Deserialize, Serialize};
use services::services::auth::AuthError;
use tracing::{info, warn};
use utils::{response::ApiResponse, text::non_blank};

use crate::{AppState, error::ApiError, middleware::AdminSession};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub current_password: String,
    pub username: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
    /// Set when the username changed, since older tokens carry the old name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl AccountResponse {
    fn new(admin: AdminUser, token: Option<String>) -> Self {
        Self {
            id: admin.id,
            username: admin.username,
            created_at: admin.created_at,
            token,
        }
    }
}

/// POST /api/login
/// Exchange admin credentials for a bearer token
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ResponseJson<ApiResponse<LoginResponse>>, ApiError> {
    let Json(request) = payload?;
    let username = request.username.trim();
    if username.is_empty() || request.password.is_empty() {
        return Err(ApiError::BadRequest(
            "username and password are required".into(),
        ));
    }

    let admin = state
        .auth
        .authenticate(&state.db.pool, username, &request.password)
        .await?;
    let token = state.auth.issue_token(&admin)?;

    info!(admin_id = admin.id, "Admin logged in");
    Ok(ResponseJson(ApiResponse::success(LoginResponse { token })))
}

/// GET /api/admin/account
pub async fn get_account(
    session: AdminSession,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<AccountResponse>>, ApiError> {
    let admin = AdminUser::find_by_id(&state.db.pool, session.admin_id()?)
        .await?
        .ok_or(ApiError::NotFound("Admin account"))?;
    Ok(ResponseJson(ApiResponse::success(AccountResponse::new(
        admin, None,
    ))))
}

/// PUT /api/admin/account
/// Change the admin username and/or password; requires the current password
pub async fn update_account(
    session: AdminSession,
    State(state): State<AppState>,
    payload: Result<Json<UpdateAccountRequest>, JsonRejection>,
) -> Result<ResponseJson<ApiResponse<AccountResponse>>, ApiError> {
    let Json(request) = payload?;
    if request.current_password.is_empty() {
        return Err(ApiError::missing_field("currentPassword"));
    }
    let new_username = non_blank(request.username);
    let new_password = request.new_password.filter(|p| !p.is_empty());
    if new_username.is_none() && new_password.is_none() {
        return Err(ApiError::BadRequest(
            "nothing to update: provide username or newPassword".into(),
        ));
    }

    let admin_id = session.admin_id()?;
    let username_changed = new_username
        .as_deref()
        .is_some_and(|name| name != session.claims.username);

    let admin = match state
        .auth
        .change_credentials(
            &state.db.pool,
            admin_id,
            &request.current_password,
            new_username,
            new_password,
        )
        .await
    {
        Ok(admin) => admin,
        Err(AuthError::InvalidCredentials) => {
            warn!(admin_id, "Account update with wrong current password");
            return Err(ApiError::BadRequest("Current password is incorrect".into()));
        }
        Err(e) => return Err(e.into()),
    };

    let token = if username_changed {
        Some(state.auth.issue_token(&admin)?)
    } else {
        None
    };
    Ok(ResponseJson(ApiResponse::success_with_message(
        AccountResponse::new(admin, token),
        "Account updated",
    )))
}

/// POST /api/admin/reset
/// Wipe the content tables and restore placeholder personal info.
pub async fn reset_content(
    session: AdminSession,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    state.db.reset_content().await?;

    warn!(admin = %session.claims.username, "Content reset");
    state.content_changed("content_reset").await;
    Ok(ResponseJson(ApiResponse::success_with_message((), "Content reset")))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/admin/account", get(get_account).put(update_account))
        .route("/admin/reset", post(reset_content))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::{ADMIN_PASSWORD, TestApp};

    #[tokio::test]
    async fn test_login() {
        let app = TestApp::new().await;

        let (status, body) = app.login("admin", ADMIN_PASSWORD).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body["data"]["token"].as_str().is_some());

        let (status, body) = app.login("admin", "wrong-password").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);

        let (status, _) = app.login("ghost", ADMIN_PASSWORD).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app.login("", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_account_requires_token() {
        let app = TestApp::new().await;
        let (status, _) = app.get("/api/admin/account").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = app.get_auth("/api/admin/account", "not-a-jwt").await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let token = app.token().await;
        let (status, body) = app.get_auth("/api/admin/account", &token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["username"], "admin");
        assert!(body["data"].get("password").is_none());
    }

    #[tokio::test]
    async fn test_change_credentials() {
        let app = TestApp::new().await;
        let token = app.token().await;

        let (status, _) = app
            .put_json(
                "/api/admin/account",
                Some(&token),
                json!({ "currentPassword": "nope-nope", "newPassword": "another-pass" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .put_json(
                "/api/admin/account",
                Some(&token),
                json!({ "currentPassword": ADMIN_PASSWORD, "newPassword": "short" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = app
            .put_json(
                "/api/admin/account",
                Some(&token),
                json!({
                    "currentPassword": ADMIN_PASSWORD,
                    "username": "owner",
                    "newPassword": "another-pass"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["username"], "owner");
        assert!(body["data"]["token"].as_str().is_some());

        let (status, _) = app.login("admin", ADMIN_PASSWORD).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = app.login("owner", "another-pass").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_reset_content() {
        let app = TestApp::new().await;
        let token = app.token().await;

        let (status, _) = app.post_json("/api/admin/reset", None, json!({})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app.post_json("/api/admin/reset", Some(&token), json!({})).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = app.get("/api/projects").await;
        assert_eq!(body["data"].as_array().unwrap().len(), 0);
        let (_, body) = app.get("/api/categories").await;
        assert!(!body["data"].as_array().unwrap().is_empty());
        let (_, body) = app.get("/api/personal-info").await;
        assert_eq!(body["data"]["name"], "Your Name");
        assert!(app.page().contains("Your Name"));
    }
}
