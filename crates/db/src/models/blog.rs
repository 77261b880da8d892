use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{DbPool, InsertedId};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
    pub date: Option<String>,
    pub author: Option<String>,
    pub slug: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlog {
    pub title: String,
    pub category: String,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
    pub date: Option<String>,
    pub author: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlog {
    pub title: Option<String>,
    pub category: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
    pub date: Option<String>,
    pub author: Option<String>,
    pub slug: Option<String>,
}

impl Blog {
    pub async fn find_all(pool: &DbPool) -> Result<Vec<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query_as::<_, Blog>(
                r#"SELECT id, title, category, excerpt, content, image, date, author, slug, created_at
                   FROM blogs
                   ORDER BY created_at DESC, id DESC"#,
            )
            .fetch_all(p)
            .await
        })
    }

    pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query_as::<_, Blog>(
                r#"SELECT id, title, category, excerpt, content, image, date, author, slug, created_at
                   FROM blogs
                   WHERE id = ?"#,
            )
            .bind(id)
            .fetch_optional(p)
            .await
        })
    }

    pub async fn find_by_slug(pool: &DbPool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query_as::<_, Blog>(
                r#"SELECT id, title, category, excerpt, content, image, date, author, slug, created_at
                   FROM blogs
                   WHERE slug = ?"#,
            )
            .bind(slug)
            .fetch_optional(p)
            .await
        })
    }

    pub async fn create(pool: &DbPool, data: &CreateBlog) -> Result<Self, sqlx::Error> {
        let id = on_pool!(pool, |p| {
            sqlx::query(
                r#"INSERT INTO blogs (title, category, excerpt, content, image, date, author, slug)
                   VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(&data.title)
            .bind(&data.category)
            .bind(&data.excerpt)
            .bind(&data.content)
            .bind(&data.image)
            .bind(&data.date)
            .bind(&data.author)
            .bind(&data.slug)
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
        data: &UpdateBlog,
    ) -> Result<Option<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query(
                r#"UPDATE blogs
                   SET title = COALESCE(?, title),
                       category = COALESCE(?, category),
                       excerpt = COALESCE(?, excerpt),
                       content = COALESCE(?, content),
                       image = COALESCE(?, image),
                       date = COALESCE(?, date),
                       author = COALESCE(?, author),
                       slug = COALESCE(?, slug)
                   WHERE id = ?"#,
            )
            .bind(&data.title)
            .bind(&data.category)
            .bind(&data.excerpt)
            .bind(&data.content)
            .bind(&data.image)
            .bind(&data.date)
            .bind(&data.author)
            .bind(&data.slug)
            .bind(id)
            .execute(p)
            .await?;
        });

        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &DbPool, id: i64) -> Result<u64, sqlx::Error> {
        let result = on_pool!(pool, |p| {
            sqlx::query("DELETE FROM blogs WHERE id = ?")
                .bind(id)
                .execute(p)
                .await?
                .rows_affected()
        });
        Ok(result)
    }
}
