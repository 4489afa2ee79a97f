//! SQLite-backed program store.
//!
//! Uses prepared statements, and a transaction where a write is followed by a read.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use super::ProgramStore;
use crate::errors::AppError;
use crate::models::{Page, PageRequest, Program, ProgramFields};

const PROGRAM_COLUMNS: &str = "id, cover, cover_content_type, title, description, start_date, end_date, tags, owner_login";

/// Program store over a SQLite connection pool.
#[derive(Clone)]
pub struct SqliteProgramStore {
    pool: SqlitePool,
}

impl SqliteProgramStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProgramStore for SqliteProgramStore {
    async fn create(&self, fields: &ProgramFields, owner: Option<&str>) -> Result<Program, AppError> {
        let result = sqlx::query(
            "INSERT INTO programs (cover, cover_content_type, title, description, start_date, end_date, tags, owner_login) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&fields.cover)
        .bind(&fields.cover_content_type)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(&fields.tags)
        .bind(owner)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        tracing::debug!("Inserted program {}", id);

        Ok(Program::from_fields(
            id,
            fields.clone(),
            owner.map(str::to_string),
        ))
    }

    async fn update(&self, id: i64, fields: &ProgramFields) -> Result<Option<Program>, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE programs SET cover = ?, cover_content_type = ?, title = ?, description = ?, start_date = ?, end_date = ?, tags = ? WHERE id = ?"
        )
        .bind(&fields.cover)
        .bind(&fields.cover_content_type)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(&fields.tags)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let row = sqlx::query(&format!("SELECT {} FROM programs WHERE id = ?", PROGRAM_COLUMNS))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        let program = program_from_row(&row)?;

        tx.commit().await?;

        Ok(Some(program))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Program>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM programs WHERE id = ?", PROGRAM_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(program_from_row).transpose()
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT 1 FROM programs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    async fn find_all(&self, request: &PageRequest) -> Result<Page<Program>, AppError> {
        let total = self.count().await?;

        // Columns come from a closed enum, never from user input
        let order_by = request
            .effective_sort()
            .iter()
            .map(|o| format!("{} {}", o.field.column(), o.direction.as_str().to_uppercase()))
            .collect::<Vec<_>>()
            .join(", ");

        let rows = sqlx::query(&format!(
            "SELECT {} FROM programs ORDER BY {} LIMIT ? OFFSET ?",
            PROGRAM_COLUMNS, order_by
        ))
        .bind(i64::from(request.size))
        .bind(i64::try_from(request.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        let content = rows
            .iter()
            .map(program_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            content,
            total,
            page: request.page,
            size: request.size,
        })
    }

    async fn find_by_owner(&self, login: &str) -> Result<Vec<Program>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM programs WHERE owner_login = ? ORDER BY id",
            PROGRAM_COLUMNS
        ))
        .bind(login)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(program_from_row).collect()
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM programs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            tracing::debug!("Delete of program {} matched no rows", id);
        }

        Ok(())
    }

    async fn count(&self) -> Result<u64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM programs")
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = row.try_get("total")?;
        Ok(u64::try_from(total).unwrap_or(0))
    }
}

// Helper functions for row conversion

fn program_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Program, AppError> {
    Ok(Program {
        id: row.try_get("id")?,
        cover: row.try_get("cover")?,
        cover_content_type: row.try_get("cover_content_type")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        tags: row.try_get("tags")?,
        owner: row.try_get("owner_login")?,
    })
}
