use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{DbPool, InsertedId};

pub const DEFAULT_AVATAR: &str = "./assets/images/avatar-default.png";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: i64,
    pub name: String,
    pub text: String,
    pub avatar: Option<String>,
    pub date: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestimonial {
    pub name: String,
    pub text: String,
    pub avatar: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTestimonial {
    pub name: Option<String>,
    pub text: Option<String>,
    pub avatar: Option<String>,
    pub date: Option<String>,
}

impl Testimonial {
    pub async fn find_all(pool: &DbPool) -> Result<Vec<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query_as::<_, Testimonial>(
                r#"SELECT id, name, text, avatar, date, created_at
                   FROM testimonials
                   ORDER BY created_at DESC, id DESC"#,
            )
            .fetch_all(p)
            .await
        })
    }

    pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query_as::<_, Testimonial>(
                r#"SELECT id, name, text, avatar, date, created_at
                   FROM testimonials
                   WHERE id = ?"#,
            )
            .bind(id)
            .fetch_optional(p)
            .await
        })
    }

    pub async fn create(pool: &DbPool, data: &CreateTestimonial) -> Result<Self, sqlx::Error> {
        let id = on_pool!(pool, |p| {
            sqlx::query("INSERT INTO testimonials (name, text, avatar, date) VALUES (?, ?, ?, ?)")
                .bind(&data.name)
                .bind(&data.text)
                .bind(&data.avatar)
                .bind(&data.date)
                .execute(p)
                .await?
                .inserted_id()
        });

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn update(
        pool: &DbPool,
        id: i64,
        data: &UpdateTestimonial,
    ) -> Result<Option<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query(
                r#"UPDATE testimonials
                   SET name = COALESCE(?, name),
                       text = COALESCE(?, text),
                       avatar = COALESCE(?, avatar),
                       date = COALESCE(?, date)
                   WHERE id = ?"#,
            )
            .bind(&data.name)
            .bind(&data.text)
            .bind(&data.avatar)
            .bind(&data.date)
            .bind(id)
            .execute(p)
            .await?;
        });

        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &DbPool, id: i64) -> Result<u64, sqlx::Error> {
        let result = on_pool!(pool, |p| {
            sqlx::query("DELETE FROM testimonials WHERE id = ?")
                .bind(id)
                .execute(p)
                .await?
                .rows_affected()
        });
        Ok(result)
    }
}
