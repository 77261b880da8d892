//! Startup and health checks that the content schema is in place.

use db::{Backend, DBService, DbPool};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

/// Every table the CMS reads or writes, with the columns the models select.
pub const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    ("projects", &["id", "title", "category", "image", "description", "created_at"]),
    ("testimonials", &["id", "name", "text", "avatar", "date", "created_at"]),
    (
        "portfolio_projects",
        &[
            "id",
            "title",
            "category",
            "image",
            "description",
            "repo_link",
            "live_link",
            "filter_category",
            "created_at",
        ],
    ),
    ("clients", &["id", "name", "logo", "website", "description", "created_at"]),
    ("categories", &["id", "name", "display_name", "created_at"]),
    (
        "blogs",
        &[
            "id", "title", "category", "excerpt", "content", "image", "date", "author", "slug",
            "created_at",
        ],
    ),
    (
        "personal_info",
        &[
            "id",
            "name",
            "title",
            "email",
            "phone",
            "birthday",
            "location",
            "avatar",
            "about_text",
            "cv_file",
            "updated_at",
        ],
    ),
    ("social_links", &["id", "name", "icon", "url", "created_at"]),
    ("education", &["id", "institution", "period", "description", "created_at"]),
    ("experience", &["id", "position", "period", "description", "created_at"]),
    ("skills", &["id", "name", "percentage", "created_at"]),
    ("admin_users", &["id", "username", "password", "created_at"]),
];

const SQLITE_TABLE_EXISTS: &str =
    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?";
const MYSQL_TABLE_EXISTS: &str = "SELECT COUNT(*) FROM information_schema.tables \
     WHERE table_schema = DATABASE() AND table_name = ?";
const SQLITE_COLUMNS: &str = "SELECT name FROM pragma_table_info(?)";
const MYSQL_COLUMNS: &str = "SELECT CAST(column_name AS CHAR) FROM information_schema.columns \
     WHERE table_schema = DATABASE() AND table_name = ?";

#[derive(Debug, Error)]
pub enum DatabaseValidationError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub struct DatabaseValidator<'a> {
    db: &'a DBService,
}

impl<'a> DatabaseValidator<'a> {
    pub fn new(db: &'a DBService) -> Self {
        Self { db }
    }

    async fn table_exists(&self, table: &str) -> Result<bool, sqlx::Error> {
        let count = match &self.db.pool {
            DbPool::Sqlite(p) => {
                sqlx::query_scalar::<_, i64>(SQLITE_TABLE_EXISTS)
                    .bind(table)
                    .fetch_one(p)
                    .await?
            }
            DbPool::MySql(p) => {
                sqlx::query_scalar::<_, i64>(MYSQL_TABLE_EXISTS)
                    .bind(table)
                    .fetch_one(p)
                    .await?
            }
        };
        Ok(count > 0)
    }

    async fn columns(&self, table: &str) -> Result<Vec<String>, sqlx::Error> {
        match &self.db.pool {
            DbPool::Sqlite(p) => {
                sqlx::query_scalar::<_, String>(SQLITE_COLUMNS)
                    .bind(table)
                    .fetch_all(p)
                    .await
            }
            DbPool::MySql(p) => {
                sqlx::query_scalar::<_, String>(MYSQL_COLUMNS)
                    .bind(table)
                    .fetch_all(p)
                    .await
            }
        }
    }

    async fn applied_migrations(&self) -> Result<i64, sqlx::Error> {
        const SQL: &str = "SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1";
        match &self.db.pool {
            DbPool::Sqlite(p) => sqlx::query_scalar::<_, i64>(SQL).fetch_one(p).await,
            DbPool::MySql(p) => sqlx::query_scalar::<_, i64>(SQL).fetch_one(p).await,
        }
    }

    /// Tables from `required` that do not exist.
    pub async fn missing_tables(
        &self,
        required: &[&str],
    ) -> Result<Vec<String>, DatabaseValidationError> {
        let mut missing = Vec::new();
        for table in required {
            if !self.table_exists(table).await? {
                missing.push(table.to_string());
            }
        }
        Ok(missing)
    }

    /// `table.column` for every expected column absent from an existing table.
    ///
    /// Tables that do not exist at all are left to [`Self::missing_tables`].
    pub async fn missing_columns(
        &self,
        required: &[(&str, &[&str])],
    ) -> Result<Vec<String>, DatabaseValidationError> {
        let mut missing = Vec::new();
        for (table, expected) in required {
            let present = self.columns(table).await?;
            if present.is_empty() {
                continue;
            }
            missing.extend(
                expected
                    .iter()
                    .filter(|column| !present.iter().any(|p| p.eq_ignore_ascii_case(column)))
                    .map(|column| format!("{table}.{column}")),
            );
        }
        Ok(missing)
    }

    pub async fn validate(&self) -> Result<ValidationResult, DatabaseValidationError> {
        let backend = self.db.backend();

        if !self.table_exists("_sqlx_migrations").await? {
            warn!(backend = %backend, "Database has no migration history");
            return Ok(ValidationResult {
                backend,
                is_initialized: false,
                migrations_applied: 0,
                missing_tables: REQUIRED_SCHEMA.iter().map(|(t, _)| t.to_string()).collect(),
                missing_columns: Vec::new(),
            });
        }

        let migrations_applied = self.applied_migrations().await?;
        let tables: Vec<&str> = REQUIRED_SCHEMA.iter().map(|(t, _)| *t).collect();
        let missing_tables = self.missing_tables(&tables).await?;
        let missing_columns = self.missing_columns(REQUIRED_SCHEMA).await?;
        if !missing_tables.is_empty() || !missing_columns.is_empty() {
            warn!(
                backend = %backend,
                tables = ?missing_tables,
                columns = ?missing_columns,
                "Database schema incomplete"
            );
        }

        info!(backend = %backend, migrations_applied, "Database validation complete");

        Ok(ValidationResult {
            backend,
            is_initialized: true,
            migrations_applied: migrations_applied as usize,
            missing_tables,
            missing_columns,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    #[serde(serialize_with = "serialize_backend")]
    pub backend: Backend,
    pub is_initialized: bool,
    pub migrations_applied: usize,
    pub missing_tables: Vec<String>,
    pub missing_columns: Vec<String>,
}

fn serialize_backend<S: serde::Serializer>(backend: &Backend, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(backend)
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        self.is_initialized && self.missing_tables.is_empty() && self.missing_columns.is_empty()
    }

    pub fn summary(&self) -> String {
        if !self.is_initialized {
            "Database not initialized - migrations need to be run".to_string()
        } else if !self.missing_tables.is_empty() {
            format!("Database is missing tables: {}", self.missing_tables.join(", "))
        } else if !self.missing_columns.is_empty() {
            format!("Database is missing columns: {}", self.missing_columns.join(", "))
        } else {
            format!(
                "Database OK ({}) - {} migrations applied",
                self.backend, self.migrations_applied
            )
        }
    }
}
