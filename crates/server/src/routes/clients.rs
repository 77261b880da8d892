use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::client::{Client, CreateClient, UpdateClient};
use services::services::uploads::UploadKind;
use tracing::info;
use utils::response::ApiResponse;

use super::RequestUploads;
use crate::{AppState, error::ApiError, form::FormData, middleware::AdminSession};

/// GET /api/clients
pub async fn get_clients(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Client>>>, ApiError> {
    let clients = Client::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(clients)))
}

/// GET /api/clients/{id}
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Client>>, ApiError> {
    let client = Client::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound("Client"))?;
    Ok(ResponseJson(ApiResponse::success(client)))
}

/// POST /api/clients
pub async fn create_client(
    _session: AdminSession,
    State(state): State<AppState>,
    form: FormData,
) -> Result<ResponseJson<ApiResponse<Client>>, ApiError> {
    let name = form.required("name")?;
    let mut uploads = RequestUploads::default();
    let logo = uploads.file_or_text(&state, &form, "logo", UploadKind::Image).await?;

    let created = Client::create(
        &state.db.pool,
        &CreateClient {
            name,
            logo,
            website: form.text("website"),
            description: form.text("description"),
        },
    )
    .await
    .map_err(ApiError::from);
    let client = uploads.settle(&state, created).await?;

    info!(client_id = client.id, "Client created");
    state.content_changed("client_created").await;
    Ok(ResponseJson(ApiResponse::success(client)))
}

/// PUT /api/clients/{id}
pub async fn update_client(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    form: FormData,
) -> Result<ResponseJson<ApiResponse<Client>>, ApiError> {
    if Client::find_by_id(&state.db.pool, id).await?.is_none() {
        return Err(ApiError::NotFound("Client"));
    }
    let mut uploads = RequestUploads::default();
    let logo = uploads.file_or_text(&state, &form, "logo", UploadKind::Image).await?;

    let updated = Client::update(
        &state.db.pool,
        id,
        &UpdateClient {
            name: form.text("name"),
            logo,
            website: form.text("website"),
            description: form.text("description"),
        },
    )
    .await
    .map_err(ApiError::from)
    .and_then(|row| row.ok_or(ApiError::NotFound("Client")));
    let client = uploads.settle(&state, updated).await?;

    info!(client_id = id, "Client updated");
    state.content_changed("client_updated").await;
    Ok(ResponseJson(ApiResponse::success(client)))
}

/// DELETE /api/clients/{id}
pub async fn delete_client(
    _session: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    if Client::delete(&state.db.pool, id).await? == 0 {
        return Err(ApiError::NotFound("Client"));
    }

    info!(client_id = id, "Client deleted");
    state.content_changed("client_deleted").await;
    Ok(ResponseJson(ApiResponse::success_with_message((), "Client deleted")))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/clients",
        Router::new()
            .route("/", get(get_clients).post(create_client))
            .route(
                "/{id}",
                get(get_client).put(update_client).delete(delete_client),
            ),
    )
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode, header},
    };

    use crate::routes::test_support::TestApp;

    fn multipart(token: &str, file_name: &str, bytes: &str) -> Request<Body> {
        let boundary = "CLIENT-BOUNDARY";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nAcme\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"logo\"; filename=\"{file_name}\"\r\nContent-Type: image/svg+xml\r\n\r\n{bytes}\r\n\
             --{b}--\r\n",
            b = boundary
        );
        Request::builder()
            .method(Method::POST)
            .uri("/api/clients")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_logo_upload_is_stored() {
        let app = TestApp::new().await;
        let token = app.token().await;

        let (status, body) = app
            .request(multipart(&token, "acme.svg", "<svg></svg>"))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");

        let logo = body["data"]["logo"].as_str().unwrap();
        assert!(logo.starts_with("./assets/images/logo-"));
        assert!(logo.ends_with(".svg"));
        let stored = app.upload_dir().join(logo.trim_start_matches("./assets/images/"));
        assert!(stored.exists());
        assert!(app.page().contains("Acme logo"));
    }

    #[tokio::test]
    async fn test_disallowed_upload_type_is_rejected() {
        let app = TestApp::new().await;
        let token = app.token().await;

        let (status, _) = app.request(multipart(&token, "run.sh", "echo hi")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
