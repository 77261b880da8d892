use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{DbPool, InsertedId};

/// A service offering shown in the "What I'm doing" section.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub image: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    pub title: String,
    pub category: String,
    pub image: Option<String>,
    pub description: Option<String>,
}

/// Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    pub title: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
}

impl Project {
    pub async fn find_all(pool: &DbPool) -> Result<Vec<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query_as::<_, Project>(
                r#"SELECT id, title, category, image, description, created_at
                   FROM projects
                   ORDER BY created_at DESC, id DESC"#,
            )
            .fetch_all(p)
            .await
        })
    }

    pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query_as::<_, Project>(
                r#"SELECT id, title, category, image, description, created_at
                   FROM projects
                   WHERE id = ?"#,
            )
            .bind(id)
            .fetch_optional(p)
            .await
        })
    }

    pub async fn create(pool: &DbPool, data: &CreateProject) -> Result<Self, sqlx::Error> {
        let id = on_pool!(pool, |p| {
            sqlx::query(
                r#"INSERT INTO projects (title, category, image, description)
                   VALUES (?, ?, ?, ?)"#,
            )
            .bind(&data.title)
            .bind(&data.category)
            .bind(&data.image)
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
        data: &UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query(
                r#"UPDATE projects
                   SET title = COALESCE(?, title),
                       category = COALESCE(?, category),
                       image = COALESCE(?, image),
                       description = COALESCE(?, description)
                   WHERE id = ?"#,
            )
            .bind(&data.title)
            .bind(&data.category)
            .bind(&data.image)
            .bind(&data.description)
            .bind(id)
            .execute(p)
            .await?;
        });

        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &DbPool, id: i64) -> Result<u64, sqlx::Error> {
        let result = on_pool!(pool, |p| {
            sqlx::query("DELETE FROM projects WHERE id = ?")
                .bind(id)
                .execute(p)
                .await?
                .rows_affected()
        });
        Ok(result)
    }
}
