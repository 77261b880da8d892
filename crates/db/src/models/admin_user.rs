use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{DbPool, InsertedId};

/// The privileged account allowed to edit content. `password` holds a bcrypt hash.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateAdminUser {
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateAdminUser {
    pub username: Option<String>,
    pub password_hash: Option<String>,
}

impl AdminUser {
    pub async fn count(pool: &DbPool) -> Result<i64, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM admin_users")
                .fetch_one(p)
                .await
        })
    }

    pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query_as::<_, AdminUser>(
                "SELECT id, username, password, created_at FROM admin_users WHERE id = ?",
            )
            .bind(id)
            .fetch_optional(p)
            .await
        })
    }

    pub async fn find_by_username(
        pool: &DbPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query_as::<_, AdminUser>(
                "SELECT id, username, password, created_at FROM admin_users WHERE username = ?",
            )
            .bind(username)
            .fetch_optional(p)
            .await
        })
    }

    pub async fn create(pool: &DbPool, data: &CreateAdminUser) -> Result<Self, sqlx::Error> {
        let id = on_pool!(pool, |p| {
            sqlx::query("INSERT INTO admin_users (username, password) VALUES (?, ?)")
                .bind(&data.username)
                .bind(&data.password_hash)
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
        data: &UpdateAdminUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query(
                r#"UPDATE admin_users
                   SET username = COALESCE(?, username),
                       password = COALESCE(?, password)
                   WHERE id = ?"#,
            )
            .bind(&data.username)
            .bind(&data.password_hash)
            .bind(id)
            .execute(p)
            .await?;
        });

        Self::find_by_id(pool, id).await
    }

    pub async fn update_password(
        pool: &DbPool,
        username: &str,
        password_hash: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = on_pool!(pool, |p| {
            sqlx::query("UPDATE admin_users SET password = ? WHERE username = ?")
                .bind(password_hash)
                .bind(username)
                .execute(p)
                .await?
                .rows_affected()
        });
        Ok(result)
    }
}
