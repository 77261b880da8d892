use std::str::FromStr;

use sqlx::{
    MySqlPool, SqlitePool,
    mysql::{MySqlPoolOptions, MySqlQueryResult},
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteQueryResult},
};
use strum_macros::{Display, EnumString};
use thiserror::Error;
use tracing::info;

/// Evaluate `$body` with `$p` bound to whichever concrete pool backs the service.
///
/// The body is type-checked once per backend, so the same SQL and binds serve both.
macro_rules! on_pool {
    ($pool:expr, |$p:ident| $body:expr) => {
        match $pool {
            $crate::DbPool::Sqlite($p) => $body,
            $crate::DbPool::MySql($p) => $body,
        }
    };
}

pub mod models;
mod seed;

use models::personal_info::RESET_PERSONAL_INFO_SQL;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Which relational store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, Default)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Backend {
    #[default]
    Sqlite,
    Mysql,
}

#[derive(Debug, Clone)]
pub enum DbPool {
    Sqlite(SqlitePool),
    MySql(MySqlPool),
}

/// Id of the row created by the last `INSERT` of a query result.
pub(crate) trait InsertedId {
    fn inserted_id(&self) -> i64;
}

impl InsertedId for SqliteQueryResult {
    fn inserted_id(&self) -> i64 {
        self.last_insert_rowid()
    }
}

impl InsertedId for MySqlQueryResult {
    fn inserted_id(&self) -> i64 {
        self.last_insert_id() as i64
    }
}

/// Tables emptied by [`DBService::reset_content`]. Categories and admin users survive a reset.
const CONTENT_TABLES: &[&str] = &[
    "projects",
    "testimonials",
    "portfolio_projects",
    "clients",
    "blogs",
    "social_links",
    "education",
    "experience",
    "skills",
];

#[derive(Debug, Clone)]
pub struct DBService {
    pub pool: DbPool,
}

impl DBService {
    /// Open the store, apply the backend's migrations and insert default content.
    pub async fn connect(backend: Backend, url: &str) -> Result<Self, DbError> {
        let pool = match backend {
            Backend::Sqlite => {
                let options = SqliteConnectOptions::from_str(url)?
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal);
                DbPool::Sqlite(
                    SqlitePoolOptions::new()
                        .max_connections(5)
                        .connect_with(options)
                        .await?,
                )
            }
            Backend::Mysql => DbPool::MySql(
                MySqlPoolOptions::new()
                    .max_connections(10)
                    .connect(url)
                    .await?,
            ),
        };

        let service = Self { pool };
        service.prepare().await?;
        info!(backend = %backend, "Database ready");
        Ok(service)
    }

    /// Migrated and seeded SQLite database living in memory.
    pub async fn new_in_memory() -> Result<Self, DbError> {
        // One long-lived connection: every other connection would see a different database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let service = Self {
            pool: DbPool::Sqlite(pool),
        };
        service.prepare().await?;
        Ok(service)
    }

    pub fn backend(&self) -> Backend {
        match self.pool {
            DbPool::Sqlite(_) => Backend::Sqlite,
            DbPool::MySql(_) => Backend::Mysql,
        }
    }

    async fn prepare(&self) -> Result<(), DbError> {
        match &self.pool {
            DbPool::Sqlite(p) => sqlx::migrate!("./migrations/sqlite").run(p).await?,
            DbPool::MySql(p) => sqlx::migrate!("./migrations/mysql").run(p).await?,
        }
        seed::insert_defaults(&self.pool).await?;
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        on_pool!(&self.pool, |p| {
            sqlx::query("SELECT 1").execute(p).await?;
        });
        Ok(())
    }

    /// Empty every content table and put placeholder personal info back, atomically.
    pub async fn reset_content(&self) -> Result<(), sqlx::Error> {
        on_pool!(&self.pool, |p| {
            let mut tx = p.begin().await?;
            for table in CONTENT_TABLES {
                sqlx::query(&format!("DELETE FROM {table}"))
                    .execute(&mut *tx)
                    .await?;
            }
            sqlx::query(RESET_PERSONAL_INFO_SQL)
                .bind(models::personal_info::placeholder_about_text())
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
        });

        info!("Content tables reset");
        Ok(())
    }
}
