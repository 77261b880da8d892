use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{DbPool, InsertedId};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub id: i64,
    pub institution: String,
    pub period: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEducation {
    pub institution: String,
    pub period: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEducation {
    pub institution: Option<String>,
    pub period: Option<String>,
    pub description: Option<String>,
}

impl Education {
    pub async fn find_all(pool: &DbPool) -> Result<Vec<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query_as::<_, Education>(
                r#"SELECT id, institution, period, description, created_at
                   FROM education
                   ORDER BY created_at DESC, id DESC"#,
            )
            .fetch_all(p)
            .await
        })
    }

    pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query_as::<_, Education>(
                "SELECT id, institution, period, description, created_at FROM education WHERE id = ?",
            )
            .bind(id)
            .fetch_optional(p)
            .await
        })
    }

    pub async fn create(pool: &DbPool, data: &CreateEducation) -> Result<Self, sqlx::Error> {
        let id = on_pool!(pool, |p| {
            sqlx::query("INSERT INTO education (institution, period, description) VALUES (?, ?, ?)")
                .bind(&data.institution)
                .bind(&data.period)
                .bind(&data.description)
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
        data: &UpdateEducation,
    ) -> Result<Option<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query(
                r#"UPDATE education
                   SET institution = COALESCE(?, institution),
                       period = COALESCE(?, period),
                       description = COALESCE(?, description)
                   WHERE id = ?"#,
            )
            .bind(&data.institution)
            .bind(&data.period)
            .bind(&data.description)
            .bind(id)
            .execute(p)
            .await?;
        });

        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &DbPool, id: i64) -> Result<u64, sqlx::Error> {
        let result = on_pool!(pool, |p| {
            sqlx::query("DELETE FROM education WHERE id = ?")
                .bind(id)
                .execute(p)
                .await?
                .rows_affected()
        });
        Ok(result)
    }
}
