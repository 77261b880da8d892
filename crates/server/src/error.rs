use axum::{
    Json,
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{
    auth::AuthError, mailer::MailError, site::RenderError, uploads::UploadError,
};
use thiserror::Error;
use tracing::error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Authentication required")]
    Unauthorized,
    #[error("Invalid or expired token")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    ServiceUnavailable(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Mail(#[from] MailError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Multipart(#[from] MultipartError),
    #[error(transparent)]
    Json(#[from] JsonRejection),
}

impl ApiError {
    pub fn missing_field(field: &str) -> Self {
        ApiError::BadRequest(format!("{field} is required"))
    }

    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            ApiError::Database(sqlx::Error::RowNotFound) => {
                (StatusCode::NOT_FOUND, "Record not found".to_string())
            }
            ApiError::Database(e)
                if e.as_database_error()
                    .is_some_and(|db_err| db_err.is_unique_violation()) =>
            {
                (
                    StatusCode::CONFLICT,
                    "A record with this value already exists".to_string(),
                )
            }
            ApiError::Auth(AuthError::InvalidCredentials) => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            ApiError::Auth(AuthError::InvalidToken(_)) => {
                (StatusCode::FORBIDDEN, "Invalid or expired token".to_string())
            }
            ApiError::Auth(AuthError::WeakPassword) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Auth(AuthError::AccountNotFound) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Upload(UploadError::UnsupportedType { .. } | UploadError::Empty(_)) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ApiError::Mail(MailError::MissingField(_) | MailError::Address(_)) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ApiError::Mail(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to send e-mail".to_string(),
            ),
            ApiError::Multipart(e) => (e.status(), e.body_text()),
            ApiError::Json(e) => (StatusCode::BAD_REQUEST, e.body_text()),
            ApiError::Database(_) | ApiError::Auth(_) | ApiError::Upload(_) | ApiError::Render(_) => {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}
