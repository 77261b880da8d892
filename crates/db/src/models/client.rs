use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{DbPool, InsertedId};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub logo: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClient {
    pub name: String,
    pub logo: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClient {
    pub name: Option<String>,
    pub logo: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
}

impl Client {
    pub async fn find_all(pool: &DbPool) -> Result<Vec<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query_as::<_, Client>(
                r#"SELECT id, name, logo, website, description, created_at
                   FROM clients
                   ORDER BY created_at DESC, id DESC"#,
            )
            .fetch_all(p)
            .await
        })
    }

    pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query_as::<_, Client>(
                r#"SELECT id, name, logo, website, description, created_at
                   FROM clients
                   WHERE id = ?"#,
            )
            .bind(id)
            .fetch_optional(p)
            .await
        })
    }

    pub async fn create(pool: &DbPool, data: &CreateClient) -> Result<Self, sqlx::Error> {
        let id = on_pool!(pool, |p| {
            sqlx::query("INSERT INTO clients (name, logo, website, description) VALUES (?, ?, ?, ?)")
                .bind(&data.name)
                .bind(&data.logo)
                .bind(&data.website)
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
        data: &UpdateClient,
    ) -> Result<Option<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query(
                r#"UPDATE clients
                   SET name = COALESCE(?, name),
                       logo = COALESCE(?, logo),
                       website = COALESCE(?, website),
                       description = COALESCE(?, description)
                   WHERE id = ?"#,
            )
            .bind(&data.name)
            .bind(&data.logo)
            .bind(&data.website)
            .bind(&data.description)
            .bind(id)
            .execute(p)
            .await?;
        });

        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &DbPool, id: i64) -> Result<u64, sqlx::Error> {
        let result = on_pool!(pool, |p| {
            sqlx::query("DELETE FROM clients WHERE id = ?")
                .bind(id)
                .execute(p)
                .await?
                .rows_affected()
        });
        Ok(result)
    }
}
