use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    response::Json as ResponseJson,
    routing::post,
};
use services::services::mailer::ContactMessage;
use tracing::{info, warn};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

/// POST /api/send-email
/// Forward a contact form message to the admin address
pub async fn send_email(
    State(state): State<AppState>,
    payload: Result<Json<ContactMessage>, JsonRejection>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let Json(message) = payload?;
    let message = message.validated()?;

    let Some(mailer) = state.mailer.as_ref() else {
        warn!("Contact message dropped, SMTP is not configured");
        return Err(ApiError::ServiceUnavailable(
            "E-mail is not configured".into(),
        ));
    };

    mailer.send_contact(&message).await?;

    info!(from = %message.email, "Contact message sent");
    Ok(ResponseJson(ApiResponse::success_with_message(
        (),
        "Message sent successfully",
    )))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/send-email", post(send_email))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn test_message_is_handed_to_mailer() {
        let app = TestApp::new().await;

        let (status, body) = app
            .post_json(
                "/api/send-email",
                None,
                json!({ "fullname": " Jane ", "email": "jane@example.com", "message": "Hi!\nBye" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");

        let sent = app.mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].fullname, "Jane");
        assert_eq!(sent[0].subject(), "New message from Jane");
    }

    #[tokio::test]
    async fn test_invalid_messages_are_rejected() {
        let app = TestApp::new().await;

        let (status, body) = app
            .post_json("/api/send-email", None, json!({ "fullname": "Jane", "email": "jane@example.com" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, _) = app
            .post_json(
                "/api/send-email",
                None,
                json!({ "fullname": "Jane", "email": "not an address", "message": "Hi" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(app.mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_mailer() {
        let app = TestApp::without_mailer().await;
        let (status, body) = app
            .post_json(
                "/api/send-email",
                None,
                json!({ "fullname": "Jane", "email": "jane@example.com", "message": "Hi" }),
            )
            .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["message"], "E-mail is not configured");
    }
}
