//! Request bodies for content mutations: multipart forms (with files), JSON or url-encoded.

use std::collections::HashMap;

use axum::{
    Form, Json,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use serde_json::Value;
use services::services::uploads::UploadedFile;
use utils::text::non_blank;

use crate::error::ApiError;

#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

/// `repo_link` <-> `repoLink`, so clients may send either spelling.
fn alternate_key(name: &str) -> String {
    if name.contains('_') {
        let mut out = String::with_capacity(name.len());
        let mut upper = false;
        for ch in name.chars() {
            if ch == '_' {
                upper = true;
            } else if upper {
                out.push(ch.to_ascii_uppercase());
                upper = false;
            } else {
                out.push(ch);
            }
        }
        out
    } else {
        let mut out = String::with_capacity(name.len() + 4);
        for ch in name.chars() {
            if ch.is_ascii_uppercase() {
                out.push('_');
                out.push(ch.to_ascii_lowercase());
            } else {
                out.push(ch);
            }
        }
        out
    }
}

impl FormData {
    /// Trimmed text value under `name` or its camelCase/snake_case twin; blank counts as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        let value = self
            .fields
            .get(name)
            .or_else(|| self.fields.get(&alternate_key(name)));
        non_blank(value.cloned())
    }

    pub fn required(&self, name: &str) -> Result<String, ApiError> {
        self.text(name).ok_or_else(|| ApiError::missing_field(name))
    }

    pub fn int(&self, name: &str) -> Result<Option<i64>, ApiError> {
        self.text(name)
            .map(|raw| {
                raw.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite() && v.fract() == 0.0)
                    .map(|v| v as i64)
                    .ok_or_else(|| ApiError::BadRequest(format!("{name} must be an integer")))
            })
            .transpose()
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)
    }

    fn from_json(value: Value) -> Result<Self, ApiError> {
        let Value::Object(map) = value else {
            return Err(ApiError::BadRequest("expected a JSON object".into()));
        };
        let fields = map
            .into_iter()
            .filter_map(|(key, value)| {
                let text = match value {
                    Value::Null => return None,
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                Some((key, text))
            })
            .collect();
        Ok(Self {
            fields,
            files: HashMap::new(),
        })
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);

            match file_name {
                Some(file_name) => {
                    let bytes = field.bytes().await?;
                    // Browsers send an empty part for file inputs left untouched.
                    if bytes.is_empty() && file_name.is_empty() {
                        continue;
                    }
                    form.files.insert(
                        name.clone(),
                        UploadedFile {
                            field: name,
                            file_name: Some(file_name),
                            content_type,
                            bytes: bytes.to_vec(),
                        },
                    );
                }
                None => {
                    let text = field.text().await?;
                    form.fields.insert(name, text);
                }
            }
        }
        Ok(form)
    }
}

impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            Self::from_multipart(multipart).await
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            Ok(Self {
                fields,
                files: HashMap::new(),
            })
        } else {
            let Json(value) = Json::<Value>::from_request(req, state).await?;
            Self::from_json(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use serde_json::json;

    use super::*;

    async fn extract(req: Request) -> Result<FormData, ApiError> {
        FormData::from_request(req, &()).await
    }

    #[tokio::test]
    async fn test_json_values_become_text() {
        let body = json!({
            "title": "  Orizon ",
            "percentage": 80,
            "about_text": ["a", "b"],
            "image": null,
            "excerpt": "   "
        });
        let req = Request::builder()
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let form = extract(req).await.unwrap();
        assert_eq!(form.text("title").as_deref(), Some("Orizon"));
        assert_eq!(form.int("percentage").unwrap(), Some(80));
        assert_eq!(form.text("about_text").as_deref(), Some(r#"["a","b"]"#));
        assert_eq!(form.text("image"), None);
        assert_eq!(form.text("excerpt"), None);
        assert!(matches!(form.required("excerpt"), Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_multipart_separates_files_from_fields() {
        let boundary = "X-BOUNDARY";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nFinance\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"p.png\"\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"logo\"; filename=\"\"\r\nContent-Type: application/octet-stream\r\n\r\n\r\n\
             --{b}--\r\n",
            b = boundary
        );
        let req = Request::builder()
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(body))
            .unwrap();

        let form = extract(req).await.unwrap();
        assert_eq!(form.text("title").as_deref(), Some("Finance"));
        let image = form.file("image").unwrap();
        assert_eq!(image.bytes, b"PNGDATA");
        assert_eq!(image.file_name.as_deref(), Some("p.png"));
        assert!(form.file("logo").is_none());
    }

    #[test]
    fn test_alternate_key() {
        assert_eq!(alternate_key("filter_category"), "filterCategory");
        assert_eq!(alternate_key("repoLink"), "repo_link");
        assert_eq!(alternate_key("title"), "title");
    }

    #[tokio::test]
    async fn test_non_integer_is_rejected() {
        let req = Request::builder()
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"percentage":"lots"}"#))
            .unwrap();
        let form = extract(req).await.unwrap();
        assert!(form.int("percentage").is_err());
    }
}
