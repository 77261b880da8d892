use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use db::models::personal_info::{PersonalInfo, UpdatePersonalInfo, encode_paragraphs};
use services::services::uploads::UploadKind;
use tracing::info;
use utils::response::ApiResponse;

use super::RequestUploads;
use crate::{AppState, error::ApiError, form::FormData, middleware::AdminSession};

/// Admin input is either a JSON array of paragraphs or plain text with one paragraph per line.
fn about_paragraphs(raw: &str) -> Vec<String> {
    if let Ok(paragraphs) = serde_json::from_str::<Vec<String>>(raw) {
        return paragraphs;
    }
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// GET /api/personal-info
pub async fn get_personal_info(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<PersonalInfo>>, ApiError> {
    let info = PersonalInfo::get(&state.db.pool)
        .await?
        .ok_or(ApiError::NotFound("Personal info"))?;
    Ok(ResponseJson(ApiResponse::success(info)))
}

/// PUT /api/personal-info
/// Accepts `avatar` and `cv` uploads
pub async fn update_personal_info(
    _session: AdminSession,
    State(state): State<AppState>,
    form: FormData,
) -> Result<ResponseJson<ApiResponse<PersonalInfo>>, ApiError> {
    let mut uploads = RequestUploads::default();
    let files = async {
        let avatar = uploads
            .file_or_text(&state, &form, "avatar", UploadKind::Image)
            .await?;
        let cv_file = uploads
            .file(&state, &form, "cv", UploadKind::Document)
            .await?
            .or_else(|| form.text("cv_file"));
        Ok::<_, ApiError>((avatar, cv_file))
    }
    .await;
    let (avatar, cv_file) = match files {
        Ok(files) => files,
        Err(e) => return uploads.settle(&state, Err(e)).await,
    };
    let about_text = form
        .text("about_text")
        .map(|raw| encode_paragraphs(&about_paragraphs(&raw)));

    let updated = PersonalInfo::update(
        &state.db.pool,
        &UpdatePersonalInfo {
            name: form.text("name"),
            title: form.text("title"),
            email: form.text("email"),
            phone: form.text("phone"),
            birthday: form.text("birthday"),
            location: form.text("location"),
            avatar,
            about_text,
            cv_file,
        },
    )
    .await
    .map_err(ApiError::from)
    .and_then(|row| row.ok_or(ApiError::NotFound("Personal info")));
    let info = uploads.settle(&state, updated).await?;

    info!("Personal info updated");
    state.content_changed("personal_info_updated").await;
    Ok(ResponseJson(ApiResponse::success(info)))
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/personal-info",
        get(get_personal_info).put(update_personal_info),
    )
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode, header},
    };
    use serde_json::json;

    use super::*;
    use crate::routes::test_support::TestApp;

    #[test]
    fn test_about_paragraphs() {
        assert_eq!(about_paragraphs(r#"["One","Two"]"#), vec!["One", "Two"]);
        assert_eq!(about_paragraphs("One\n\n  Two  \n"), vec!["One", "Two"]);
        assert_eq!(about_paragraphs("[not json"), vec!["[not json"]);
    }

    #[tokio::test]
    async fn test_update_personal_info() {
        let app = TestApp::new().await;
        let token = app.token().await;

        let (status, body) = app.get("/api/personal-info").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Richard hanrick");

        let (status, body) = app
            .put_json(
                "/api/personal-info",
                Some(&token),
                json!({ "name": "Ada Lovelace", "aboutText": "First line\nSecond line" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["name"], "Ada Lovelace");
        assert_eq!(body["data"]["title"], "Web developer");
        assert_eq!(body["data"]["aboutText"], r#"["First line","Second line"]"#);

        let page = app.page();
        assert!(page.contains("Ada Lovelace"));
        assert!(page.contains("<p>Second line</p>"));
    }

    #[tokio::test]
    async fn test_cv_upload() {
        let app = TestApp::new().await;
        let token = app.token().await;

        let boundary = "CV-BOUNDARY";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"cv\"; filename=\"resume.pdf\"\r\nContent-Type: application/pdf\r\n\r\n%PDF-1.4\r\n--{b}--\r\n",
            b = boundary
        );
        let request = Request::builder()
            .method(Method::PUT)
            .uri("/api/personal-info")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let (status, body) = app.request(request).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let cv = body["data"]["cvFile"].as_str().unwrap();
        assert!(cv.starts_with("./assets/images/cv-"));
        assert!(cv.ends_with(".pdf"));

        let file_name = cv.rsplit('/').next().unwrap();
        assert!(app.upload_dir().join(file_name).exists());
    }
}
