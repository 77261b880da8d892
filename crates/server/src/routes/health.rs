use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use serde::Serialize;
use services::services::database_validator::{DatabaseValidator, ValidationResult};
use tracing::error;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub message: String,
    pub database: ValidationResult,
    pub last_update: i64,
}

/// GET /api/health
/// Store reachability plus the schema validator report
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<HealthStatus>>, ApiError> {
    if let Err(e) = state.db.ping().await {
        error!(error = %e, "Database ping failed");
        return Err(ApiError::ServiceUnavailable("Database unavailable".into()));
    }

    let database = DatabaseValidator::new(&state.db)
        .validate()
        .await
        .map_err(|e| {
            error!(error = %e, "Database validation failed");
            ApiError::ServiceUnavailable("Database unavailable".into())
        })?;

    Ok(ResponseJson(ApiResponse::success(HealthStatus {
        status: if database.is_ok() { "ok" } else { "degraded" },
        message: database.summary(),
        database,
        last_update: state.last_update(),
    })))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use db::DbPool;

    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn test_health_reports_schema() {
        let app = TestApp::new().await;
        let (status, body) = app.get("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "ok");
        assert_eq!(body["data"]["database"]["backend"], "sqlite");
        assert_eq!(body["data"]["database"]["missingTables"].as_array().unwrap().len(), 0);
        assert!(body["data"]["database"]["migrationsApplied"].as_u64().unwrap() >= 1);
    }

    #[tokio::test]
    async fn test_missing_column_reports_degraded() {
        let app = TestApp::new().await;
        let DbPool::Sqlite(pool) = &app.state.db.pool else {
            unreachable!("test store is sqlite");
        };
        sqlx::query("ALTER TABLE blogs DROP COLUMN author")
            .execute(pool)
            .await
            .unwrap();

        let (status, body) = app.get("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "degraded");
        assert_eq!(body["data"]["database"]["missingColumns"][0], "blogs.author");
    }
}
