use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{DbPool, InsertedId};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: i64,
    pub name: String,
    /// Proficiency, 0 to 100.
    pub percentage: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSkill {
    pub name: String,
    pub percentage: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSkill {
    pub name: Option<String>,
    pub percentage: Option<i64>,
}

impl Skill {
    pub async fn find_all(pool: &DbPool) -> Result<Vec<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query_as::<_, Skill>(
                "SELECT id, name, percentage, created_at FROM skills ORDER BY created_at, id",
            )
            .fetch_all(p)
            .await
        })
    }

    pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query_as::<_, Skill>(
                "SELECT id, name, percentage, created_at FROM skills WHERE id = ?",
            )
            .bind(id)
            .fetch_optional(p)
            .await
        })
    }

    pub async fn create(pool: &DbPool, data: &CreateSkill) -> Result<Self, sqlx::Error> {
        let id = on_pool!(pool, |p| {
            sqlx::query("INSERT INTO skills (name, percentage) VALUES (?, ?)")
                .bind(&data.name)
                .bind(data.percentage)
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
        data: &UpdateSkill,
    ) -> Result<Option<Self>, sqlx::Error> {
        on_pool!(pool, |p| {
            sqlx::query(
                r#"UPDATE skills
                   SET name = COALESCE(?, name),
                       percentage = COALESCE(?, percentage)
                   WHERE id = ?"#,
            )
            .bind(&data.name)
            .bind(data.percentage)
            .bind(id)
            .execute(p)
            .await?;
        });

        Self::find_by_id(pool, id).await
    }

    pub async fn delete(pool: &DbPool, id: i64) -> Result<u64, sqlx::Error> {
        let result = on_pool!(pool, |p| {
            sqlx::query("DELETE FROM skills WHERE id = ?")
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
    use crate::DBService;

    #[tokio::test]
    async fn test_skills_keep_insertion_order() {
        let db = DBService::new_in_memory().await.unwrap();
        let created = Skill::create(
            &db.pool,
            &CreateSkill {
                name: "Rust".into(),
                percentage: 75,
            },
        )
        .await
        .unwrap();

        let all = Skill::find_all(&db.pool).await.unwrap();
        assert_eq!(all.first().map(|s| s.name.as_str()), Some("Web design"));
        assert_eq!(all.last().map(|s| s.id), Some(created.id));

        let updated = Skill::update(
            &db.pool,
            created.id,
            &UpdateSkill {
                percentage: Some(90),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.percentage, 90);
        assert_eq!(updated.name, "Rust");
    }
}
