pub mod auth;
pub mod blogs;
pub mod categories;
pub mod clients;
pub mod contact;
pub mod education;
pub mod experience;
pub mod health;
pub mod last_update;
pub mod personal_info;
pub mod portfolio_projects;
pub mod projects;
pub mod skills;
pub mod social_links;
pub mod testimonials;

#[cfg(test)]
pub(crate) mod test_support;

use services::services::uploads::UploadKind;

use crate::{AppState, error::ApiError, form::FormData};

/// Files stored while handling one request; removed again when the request fails afterwards.
#[derive(Debug, Default)]
pub(crate) struct RequestUploads {
    stored: Vec<String>,
}

impl RequestUploads {
    /// Public path of the file uploaded under `field`, if one was sent.
    pub(crate) async fn file(
        &mut self,
        state: &AppState,
        form: &FormData,
        field: &str,
        kind: UploadKind,
    ) -> Result<Option<String>, ApiError> {
        let Some(file) = form.file(field) else {
            return Ok(None);
        };
        let path = state.uploads.save(file, kind).await?;
        self.stored.push(path.clone());
        Ok(Some(path))
    }

    /// Public path of the file uploaded under `field`, else the field's text value.
    pub(crate) async fn file_or_text(
        &mut self,
        state: &AppState,
        form: &FormData,
        field: &str,
        kind: UploadKind,
    ) -> Result<Option<String>, ApiError> {
        match self.file(state, form, field, kind).await? {
            Some(path) => Ok(Some(path)),
            None => Ok(form.text(field)),
        }
    }

    /// Pass `result` through, deleting the files stored for this request if it is an error.
    pub(crate) async fn settle<T>(
        self,
        state: &AppState,
        result: Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        if result.is_err() {
            for path in &self.stored {
                state.uploads.discard(path).await;
            }
        }
        result
    }
}
