use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{DbPool, InsertedId};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: i64,
    pub position: String,
    pub period: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExperience {
    pub position: String,
    pub period: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExperience {
    pub position: Option<String>,
    pub period: Option<String>,
    pub description: Option<String>,
}

impl Experience {
    pub async fn find_all(pool: &DbPool) -> Result<Vec<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query_as::<_, Experience>(
                r#"SELECT id, position, period, description, created_at
                   FROM experience
                   ORDER BY created_at DESC, id DESC"#,
            )
            .fetch_all(p)
            .await
        })
    }

    pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query_as::<_, Experience>(
                "SELECT id, position, period, description, created_at FROM experience WHERE id = ?",
            )
            .bind(id)
            .fetch_optional(p)
            .await
        })
    }

    pub async fn create(pool: &DbPool, data: &CreateExperience) -> Result<Self, sqlx::Error> {
        let id = on_pool!(pool, |p| {
            sqlx::query("INSERT INTO experience (position, period, description) VALUES (?, ?, ?)")
                .bind(&data.position)
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
        data: &UpdateExperience,
    ) -> Result<Option<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query(
                r#"UPDATE experience
                   SET position = COALESCE(?, position),
                       period = COALESCE(?, period),
                       description = COALESCE(?, description)
                   WHERE id = ?"#,
            )
            .bind(&data.position)
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
            sqlx::query("DELETE FROM experience WHERE id = ?")
                .bind(id)
                .execute(p)
                .await?
                .rows_affected()
        });
        Ok(result)
    }
}
