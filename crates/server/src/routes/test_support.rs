use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use db::DBService;
use http_body_util::BodyExt;
use serde_json::Value;
use services::services::{
    auth::AuthService,
    mailer::{ContactMessage, MailError, Mailer},
    site::Region,
};
use strum::IntoEnumIterator;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::{AppState, app, config::Config};

pub const ADMIN_PASSWORD: &str = "password123";

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<ContactMessage>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_contact(&self, message: &ContactMessage) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Application over an in-memory database and a temporary public directory.
pub struct TestApp {
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
    dir: TempDir,
}

fn template() -> String {
    let mut page = String::from("<html><body>\n");
    for region in Region::iter() {
        page.push_str(&format!("{}\n{}\n", region.start_marker(), region.end_marker()));
    }
    page.push_str("</body></html>\n");
    page
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(true, None).await
    }

    pub async fn without_mailer() -> Self {
        Self::build(false, None).await
    }

    /// The renderer points at a template that does not exist, so every regeneration fails.
    pub async fn with_missing_template() -> Self {
        Self::build(true, Some("missing.html")).await
    }

    async fn build(with_mailer: bool, template_name: Option<&str>) -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.html"), template()).unwrap();

        let public_dir = dir.path().to_string_lossy().to_string();
        let template_path =
            template_name.map(|name| dir.path().join(name).to_string_lossy().to_string());
        let config = Config::from_lookup(|key| match key {
            "PUBLIC_DIR" => Some(public_dir.clone()),
            "TEMPLATE_PATH" => template_path.clone(),
            "JWT_SECRET" => Some("test-secret".into()),
            "BCRYPT_COST" => Some("4".into()),
            _ => None,
        })
        .unwrap();

        let db = DBService::new_in_memory().await.unwrap();
        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState::new(
            config,
            db,
            with_mailer.then(|| mailer.clone() as Arc<dyn Mailer>),
        )
        .unwrap();

        let hash = state.auth.hash_password(ADMIN_PASSWORD).await.unwrap();
        AuthService::ensure_admin(&state.db.pool, "admin", &hash)
            .await
            .unwrap();

        Self { state, mailer, dir }
    }

    pub fn page(&self) -> String {
        std::fs::read_to_string(self.dir.path().join("index.html")).unwrap()
    }

    pub async fn request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = app(self.state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn json_request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Self::json_request(Method::GET, uri, None, None)).await
    }

    pub async fn get_auth(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Self::json_request(Method::GET, uri, Some(token), None))
            .await
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Self::json_request(Method::POST, uri, token, Some(body)))
            .await
    }

    pub async fn put_json(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Self::json_request(Method::PUT, uri, token, Some(body)))
            .await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Self::json_request(Method::DELETE, uri, token, None))
            .await
    }

    pub async fn login(&self, username: &str, password: &str) -> (StatusCode, Value) {
        self.post_json(
            "/api/login",
            None,
            serde_json::json!({ "username": username, "password": password }),
        )
        .await
    }

    pub async fn token(&self) -> String {
        let (status, body) = self.login("admin", ADMIN_PASSWORD).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }

    pub fn upload_dir(&self) -> std::path::PathBuf {
        self.state.uploads.dir().to_path_buf()
    }
}
