use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{DbPool, InsertedId};

/// Re-points every item filed under an old category key. Binds: new key, new display name, old key.
pub(crate) const UPDATE_CATEGORY_REFERENCES_SQL: &str = r#"UPDATE portfolio_projects
   SET filter_category = ?, category = ?
   WHERE filter_category = ?"#;

/// A showcased work entry in the portfolio grid.
///
/// `category` is the human readable label printed under the item while
/// `filter_category` holds the category key used by the filter buttons.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioProject {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub image: Option<String>,
    pub description: Option<String>,
    pub repo_link: Option<String>,
    pub live_link: Option<String>,
    pub filter_category: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePortfolioProject {
    pub title: String,
    pub category: String,
    pub image: Option<String>,
    pub description: Option<String>,
    pub repo_link: Option<String>,
    pub live_link: Option<String>,
    pub filter_category: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePortfolioProject {
    pub title: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub repo_link: Option<String>,
    pub live_link: Option<String>,
    pub filter_category: Option<String>,
}

impl PortfolioProject {
    /// Key used by the filter buttons, falling back to the label for legacy rows.
    pub fn filter_key(&self) -> &str {
        self.filter_category
            .as_deref()
            .filter(|key| !key.is_empty())
            .unwrap_or(&self.category)
    }

    pub async fn find_all(pool: &DbPool) -> Result<Vec<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query_as::<_, PortfolioProject>(
                r#"SELECT id, title, category, image, description, repo_link, live_link,
                          filter_category, created_at
                   FROM portfolio_projects
                   ORDER BY created_at DESC, id DESC"#,
            )
            .fetch_all(p)
            .await
        })
    }

    pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query_as::<_, PortfolioProject>(
                r#"SELECT id, title, category, image, description, repo_link, live_link,
                          filter_category, created_at
                   FROM portfolio_projects
                   WHERE id = ?"#,
            )
            .bind(id)
            .fetch_optional(p)
            .await
        })
    }

    pub async fn find_by_filter_category(
        pool: &DbPool,
        filter_category: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query_as::<_, PortfolioProject>(
                r#"SELECT id, title, category, image, description, repo_link, live_link,
                          filter_category, created_at
                   FROM portfolio_projects
                   WHERE filter_category = ?
                   ORDER BY created_at DESC, id DESC"#,
            )
            .bind(filter_category)
            .fetch_all(p)
            .await
        })
    }

    pub async fn create(
        pool: &DbPool,
        data: &CreatePortfolioProject,
    ) -> Result<Self, sqlx::Error> {
        let id = on_pool!(pool, |p| {
            sqlx::query(
                r#"INSERT INTO portfolio_projects
                       (title, category, image, description, repo_link, live_link, filter_category)
                   VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(&data.title)
            .bind(&data.category)
            .bind(&data.image)
            .bind(&data.description)
            .bind(&data.repo_link)
            .bind(&data.live_link)
            .bind(&data.filter_category)
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
        data: &UpdatePortfolioProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query(
                r#"UPDATE portfolio_projects
                   SET title = COALESCE(?, title),
                       category = COALESCE(?, category),
                       image = COALESCE(?, image),
                       description = COALESCE(?, description),
                       repo_link = COALESCE(?, repo_link),
                       live_link = COALESCE(?, live_link),
                       filter_category = COALESCE(?, filter_category)
                   WHERE id = ?"#,
            )
            .bind(&data.title)
            .bind(&data.category)
            .bind(&data.image)
            .bind(&data.description)
            .bind(&data.repo_link)
            .bind(&data.live_link)
            .bind(&data.filter_category)
            .bind(id)
            .execute(p)
            .await?;
        });

        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &DbPool, id: i64) -> Result<u64, sqlx::Error> {
        let result = on_pool!(pool, |p| {
            sqlx::query("DELETE FROM portfolio_projects WHERE id = ?")
                .bind(id)
                .execute(p)
                .await?
                .rows_affected()
        });
        Ok(result)
    }
}
