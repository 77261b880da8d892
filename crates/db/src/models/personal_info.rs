use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::DbPool;

/// The singleton row always lives at this id.
pub const PERSONAL_INFO_ID: i64 = 1;

/// Placeholder values written by a content reset. Binds: about text.
pub(crate) const RESET_PERSONAL_INFO_SQL: &str = r#"UPDATE personal_info
   SET name = 'Your Name',
       title = 'Your Title',
       email = 'you@example.com',
       phone = '+33 1 23 45 67 89',
       birthday = '1990-01-01',
       location = 'Your City, Country',
       avatar = './assets/images/my-avatar.png',
       about_text = ?,
       cv_file = NULL,
       updated_at = CURRENT_TIMESTAMP
   WHERE id = 1"#;

pub(crate) fn placeholder_about_text() -> String {
    encode_paragraphs(&["Your personal introduction here.".to_string()])
}

/// Encode the about paragraphs the way they are stored in `about_text`.
pub fn encode_paragraphs(paragraphs: &[String]) -> String {
    serde_json::Value::from(paragraphs.to_vec()).to_string()
}

/// Owner details shown in the sidebar and the "About me" section.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub birthday: String,
    pub location: String,
    pub avatar: Option<String>,
    /// JSON array of paragraphs.
    pub about_text: Option<String>,
    pub cv_file: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePersonalInfo {
    pub name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<String>,
    pub location: Option<String>,
    pub avatar: Option<String>,
    pub about_text: Option<String>,
    pub cv_file: Option<String>,
}

impl PersonalInfo {
    /// About paragraphs; a value that is not a JSON array is treated as a single paragraph.
    pub fn paragraphs(&self) -> Vec<String> {
        match self.about_text.as_deref() {
            None => Vec::new(),
            Some(raw) => serde_json::from_str::<Vec<String>>(raw)
                .unwrap_or_else(|_| vec![raw.to_string()]),
        }
    }

    pub async fn get(pool: &DbPool) -> Result<Option<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query_as::<_, PersonalInfo>(
                r#"SELECT id, name, title, email, phone, birthday, location, avatar,
                          about_text, cv_file, updated_at
                   FROM personal_info
                   WHERE id = ?"#,
            )
            .bind(PERSONAL_INFO_ID)
            .fetch_optional(p)
            .await
        })
    }

    pub async fn update(
        pool: &DbPool,
        data: &UpdatePersonalInfo,
    ) -> Result<Option<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query(
                r#"UPDATE personal_info
                   SET name = COALESCE(?, name),
                       title = COALESCE(?, title),
                       email = COALESCE(?, email),
                       phone = COALESCE(?, phone),
                       birthday = COALESCE(?, birthday),
                       location = COALESCE(?, location),
                       avatar = COALESCE(?, avatar),
                       about_text = COALESCE(?, about_text),
                       cv_file = COALESCE(?, cv_file),
                       updated_at = CURRENT_TIMESTAMP
                   WHERE id = ?"#,
            )
            .bind(&data.name)
            .bind(&data.title)
            .bind(&data.email)
            .bind(&data.phone)
            .bind(&data.birthday)
            .bind(&data.location)
            .bind(&data.avatar)
            .bind(&data.about_text)
            .bind(&data.cv_file)
            .bind(PERSONAL_INFO_ID)
            .execute(p)
            .await?;
        });

        Self::get(pool).await
    }
}
