//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for all application data. Handlers only
//! see the [`ProgramStore`] trait so that tests can swap in the in-memory store.

#[cfg(test)]
mod memory;
mod repository;

#[cfg(test)]
pub use memory::*;
pub use repository::*;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::errors::AppError;
use crate::models::{Page, PageRequest, Program, ProgramFields};

/// Persistence operations over program records.
#[async_trait]
pub trait ProgramStore: Send + Sync {
    /// Insert a new record; the store assigns the id.
    async fn create(&self, fields: &ProgramFields, owner: Option<&str>) -> Result<Program, AppError>;

    /// Replace the writable fields of an existing record.
    ///
    /// Returns `None` when no record has that id. The owner is left untouched.
    async fn update(&self, id: i64, fields: &ProgramFields) -> Result<Option<Program>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Program>, AppError>;

    async fn exists_by_id(&self, id: i64) -> Result<bool, AppError>;

    async fn find_all(&self, request: &PageRequest) -> Result<Page<Program>, AppError>;

    /// All records owned by `login`, ordered by id.
    async fn find_by_owner(&self, login: &str) -> Result<Vec<Program>, AppError>;

    /// Remove a record. Unknown ids are ignored.
    async fn delete_by_id(&self, id: i64) -> Result<(), AppError>;

    async fn count(&self) -> Result<u64, AppError>;
}

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS programs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            cover BLOB,
            cover_content_type TEXT,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            tags TEXT,
            owner_login TEXT
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_programs_owner_login ON programs(owner_login);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
