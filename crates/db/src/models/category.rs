use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::info;

use super::portfolio_project::UPDATE_CATEGORY_REFERENCES_SQL;
use crate::{DbPool, InsertedId};

/// A portfolio filter tag.
///
/// `name` is the stable key stored on portfolio items (`filter_category`),
/// `display_name` is what visitors see on the filter buttons.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategory {
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub display_name: Option<String>,
}

/// Outcome of a category update, including how many portfolio items followed the rename.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    pub category: Category,
    pub updated_projects: u64,
}

const SELECT_BY_ID: &str =
    "SELECT id, name, display_name, created_at FROM categories WHERE id = ?";

impl Category {
    pub async fn find_all(pool: &DbPool) -> Result<Vec<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query_as::<_, Category>(
                r#"SELECT id, name, display_name, created_at
                   FROM categories
                   ORDER BY display_name, id"#,
            )
            .fetch_all(p)
            .await
        })
    }

    pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query_as::<_, Category>(SELECT_BY_ID)
                .bind(id)
                .fetch_optional(p)
                .await
        })
    }

    pub async fn find_by_name(pool: &DbPool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query_as::<_, Category>(
                "SELECT id, name, display_name, created_at FROM categories WHERE name = ?",
            )
            .bind(name)
            .fetch_optional(p)
            .await
        })
    }

    pub async fn create(pool: &DbPool, data: &CreateCategory) -> Result<Self, sqlx::Error> {
        let id = on_pool!(pool, |p| {
            sqlx::query("INSERT INTO categories (name, display_name) VALUES (?, ?)")
                .bind(&data.name)
                .bind(&data.display_name)
                .execute(p)
                .await?
                .inserted_id()
        });

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Update the category and carry a rename over to every portfolio item filed under it.
    ///
    /// The current key is read inside the same transaction as both writes, so items never
    /// point at a key that no longer exists.
    pub async fn update_with_cascade(
        pool: &DbPool,
        id: i64,
        data: &UpdateCategory,
    ) -> Result<Option<CategoryUpdate>, sqlx::Error> {
        let select = match pool {
            DbPool::MySql(_) => format!("{SELECT_BY_ID} FOR UPDATE"),
            DbPool::Sqlite(_) => SELECT_BY_ID.to_string(),
        };

        let (existing, new_name, renamed, updated_projects) = on_pool!(pool, |p| {
            let mut tx = p.begin().await?;

            let Some(existing) = sqlx::query_as::<_, Category>(&select)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
            else {
                return Ok(None);
            };

            let new_name = data.name.clone().unwrap_or_else(|| existing.name.clone());
            let new_display_name = data
                .display_name
                .clone()
                .unwrap_or_else(|| existing.display_name.clone());
            let renamed =
                new_name != existing.name || new_display_name != existing.display_name;

            sqlx::query(
                r#"UPDATE categories
                   SET name = ?,
                       display_name = ?
                   WHERE id = ?"#,
            )
            .bind(&new_name)
            .bind(&new_display_name)
            .bind(id)
            .execute(&mut *tx)
            .await?;

            let moved = if renamed {
                sqlx::query(UPDATE_CATEGORY_REFERENCES_SQL)
                    .bind(&new_name)
                    .bind(&new_display_name)
                    .bind(&existing.name)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected()
            } else {
                0
            };

            tx.commit().await?;
            (existing, new_name, renamed, moved)
        });

        if renamed {
            info!(
                category_id = id,
                from = %existing.name,
                to = %new_name,
                updated_projects,
                "Category renamed"
            );
        }

        let category = Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        Ok(Some(CategoryUpdate {
            category,
            updated_projects,
        }))
    }

    pub async fn delete(pool: &DbPool, id: i64) -> Result<u64, sqlx::Error> {
        let result = on_pool!(pool, |p| {
            sqlx::query("DELETE FROM categories WHERE id = ?")
                .bind(id)
                .execute(p)
                .await?
                .rows_affected()
        });
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DBService,
        models::portfolio_project::{CreatePortfolioProject, PortfolioProject},
    };

    #[tokio::test]
    async fn test_rename_cascades_to_portfolio_items() {
        let db = DBService::new_in_memory().await.unwrap();
        let category = Category::find_by_name(&db.pool, "web design")
            .await
            .unwrap()
            .unwrap();

        let item = PortfolioProject::create(
            &db.pool,
            &CreatePortfolioProject {
                title: "Landing page".into(),
                category: "Web Design".into(),
                filter_category: Some("web design".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let outcome = Category::update_with_cascade(
            &db.pool,
            category.id,
            &UpdateCategory {
                name: Some("ui design".into()),
                display_name: Some("UI Design".into()),
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(outcome.updated_projects, 1);
        assert_eq!(outcome.category.name, "ui design");
        assert_eq!(outcome.category.display_name, "UI Design");

        let item = PortfolioProject::find_by_id(&db.pool, item.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item.filter_category.as_deref(), Some("ui design"));
        assert_eq!(item.category, "UI Design");
        assert!(Category::find_by_name(&db.pool, "web design").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_display_name_only_change_relabels_items() {
        let db = DBService::new_in_memory().await.unwrap();
        let category = Category::find_by_name(&db.pool, "applications")
            .await
            .unwrap()
            .unwrap();
        let item = PortfolioProject::create(
            &db.pool,
            &CreatePortfolioProject {
                title: "Todo".into(),
                category: "Applications".into(),
                filter_category: Some("applications".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let outcome = Category::update_with_cascade(
            &db.pool,
            category.id,
            &UpdateCategory {
                name: None,
                display_name: Some("Apps".into()),
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(outcome.updated_projects, 1);

        let item = PortfolioProject::find_by_id(&db.pool, item.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item.filter_category.as_deref(), Some("applications"));
        assert_eq!(item.category, "Apps");
    }

    #[tokio::test]
    async fn test_consecutive_renames_follow_latest_key() {
        let db = DBService::new_in_memory().await.unwrap();
        let category = Category::find_by_name(&db.pool, "web development")
            .await
            .unwrap()
            .unwrap();
        let item = PortfolioProject::create(
            &db.pool,
            &CreatePortfolioProject {
                title: "Storefront".into(),
                category: "Web Development".into(),
                filter_category: Some("web development".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        for (key, label) in [("frontend", "Frontend"), ("web apps", "Web Apps")] {
            let outcome = Category::update_with_cascade(
                &db.pool,
                category.id,
                &UpdateCategory {
                    name: Some(key.into()),
                    display_name: Some(label.into()),
                },
            )
            .await
            .unwrap()
            .unwrap();
            assert_eq!(outcome.updated_projects, 1);
        }

        let item = PortfolioProject::find_by_id(&db.pool, item.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item.filter_category.as_deref(), Some("web apps"));
        assert_eq!(item.category, "Web Apps");
    }

    #[tokio::test]
    async fn test_missing_category_update_is_none() {
        let db = DBService::new_in_memory().await.unwrap();
        let outcome = Category::update_with_cascade(
            &db.pool,
            9_999,
            &UpdateCategory {
                name: Some("ghost".into()),
                display_name: None,
            },
        )
        .await
        .unwrap();
        assert!(outcome.is_none());
        assert!(Category::find_by_name(&db.pool, "ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unchanged_update_touches_nothing() {
        let db = DBService::new_in_memory().await.unwrap();
        let category = Category::find_by_name(&db.pool, "mobile apps")
            .await
            .unwrap()
            .unwrap();
        let outcome = Category::update_with_cascade(&db.pool, category.id, &UpdateCategory::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome.updated_projects, 0);
        assert_eq!(outcome.category, category);
    }

    #[tokio::test]
    async fn test_duplicate_name_is_unique_violation() {
        let db = DBService::new_in_memory().await.unwrap();
        let err = Category::create(
            &db.pool,
            &CreateCategory {
                name: "web design".into(),
                display_name: "Again".into(),
            },
        )
        .await
        .unwrap_err();

        match err {
            sqlx::Error::Database(db_err) => assert!(db_err.is_unique_violation()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_category_update_returns_none() {
        let db = DBService::new_in_memory().await.unwrap();
        let outcome = Category::update_with_cascade(&db.pool, 4_242, &UpdateCategory::default())
            .await
            .unwrap();
        assert!(outcome.is_none());
    }
}
