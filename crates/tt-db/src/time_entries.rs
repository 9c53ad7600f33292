//! Time entry repository
//!
//! Database operations for time entries.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{FromRow, PgPool};
use tt_core::traits::Id;
use tt_models::{NewTimeEntry, TimeEntry, TimeEntryFilter};

use crate::repository::{RepositoryError, RepositoryResult};

/// Time entry database row
#[derive(Debug, Clone, FromRow)]
pub struct TimeEntryRow {
    pub id: i64,
    pub employee_id: i64,
    pub project_id: Option<i64>,
    pub entry_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<i64>,
}

impl From<TimeEntryRow> for TimeEntry {
    fn from(row: TimeEntryRow) -> Self {
        TimeEntry {
            id: row.id,
            employee_id: row.employee_id,
            project_id: row.project_id,
            entry_date: row.entry_date,
            start_time: row.start_time,
            end_time: row.end_time,
            description: row.description,
            created_at: row.created_at,
            created_by: row.created_by,
        }
    }
}

const ENTRY_COLUMNS: &str =
    "id, employee_id, project_id, entry_date, start_time, end_time, description, created_at, created_by";

/// Time entry persistence
#[async_trait]
pub trait TimeEntryStore: Send + Sync {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<TimeEntry>>;

    /// Filtered list ordered by date, then start time
    async fn list(&self, filter: &TimeEntryFilter) -> RepositoryResult<Vec<TimeEntry>>;

    async fn create(&self, entry: &NewTimeEntry) -> RepositoryResult<TimeEntry>;

    /// Overwrite the mutable columns of a stored entry
    async fn update(&self, entry: &TimeEntry) -> RepositoryResult<TimeEntry>;

    async fn set_project(&self, id: Id, project_id: Option<Id>) -> RepositoryResult<TimeEntry>;

    async fn delete(&self, id: Id) -> RepositoryResult<()>;

    /// Any entry of the employee, at any date, without a project
    async fn has_unassigned(&self, employee_id: Id) -> RepositoryResult<bool>;
}

/// PostgreSQL time entry repository
pub struct TimeEntryRepository {
    pool: PgPool,
}

impl TimeEntryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TimeEntryStore for TimeEntryRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<TimeEntry>> {
        let row = sqlx::query_as::<_, TimeEntryRow>(&format!(
            "SELECT {} FROM time_entries WHERE id = $1",
            ENTRY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(TimeEntry::from))
    }

    async fn list(&self, filter: &TimeEntryFilter) -> RepositoryResult<Vec<TimeEntry>> {
        let rows = sqlx::query_as::<_, TimeEntryRow>(&format!(
            r#"
            SELECT {}
            FROM time_entries
            WHERE ($1::BIGINT IS NULL OR employee_id = $1)
              AND ($2::BIGINT IS NULL OR project_id = $2)
              AND ($3::DATE IS NULL OR entry_date >= $3)
              AND ($4::DATE IS NULL OR entry_date <= $4)
              AND ($5 = FALSE OR project_id IS NULL)
            ORDER BY entry_date, start_time, id
            "#,
            ENTRY_COLUMNS
        ))
        .bind(filter.employee_id)
        .bind(filter.project_id)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.unassigned_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TimeEntry::from).collect())
    }

    async fn create(&self, entry: &NewTimeEntry) -> RepositoryResult<TimeEntry> {
        let row = sqlx::query_as::<_, TimeEntryRow>(&format!(
            r#"
            INSERT INTO time_entries (
                employee_id, project_id, entry_date, start_time, end_time,
                description, created_at, created_by
            ) VALUES ($1, $2, $3, $4, $5, $6, NOW(), $7)
            RETURNING {}
            "#,
            ENTRY_COLUMNS
        ))
        .bind(entry.employee_id)
        .bind(entry.project_id)
        .bind(entry.entry_date)
        .bind(entry.start_time)
        .bind(entry.end_time)
        .bind(&entry.description)
        .bind(entry.created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(TimeEntry::from(row))
    }

    async fn update(&self, entry: &TimeEntry) -> RepositoryResult<TimeEntry> {
        let row = sqlx::query_as::<_, TimeEntryRow>(&format!(
            r#"
            UPDATE time_entries SET
                project_id = $1,
                entry_date = $2,
                start_time = $3,
                end_time = $4,
                description = $5
            WHERE id = $6
            RETURNING {}
            "#,
            ENTRY_COLUMNS
        ))
        .bind(entry.project_id)
        .bind(entry.entry_date)
        .bind(entry.start_time)
        .bind(entry.end_time)
        .bind(&entry.description)
        .bind(entry.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Time entry", entry.id))?;

        Ok(TimeEntry::from(row))
    }

    async fn set_project(&self, id: Id, project_id: Option<Id>) -> RepositoryResult<TimeEntry> {
        let row = sqlx::query_as::<_, TimeEntryRow>(&format!(
            "UPDATE time_entries SET project_id = $1 WHERE id = $2 RETURNING {}",
            ENTRY_COLUMNS
        ))
        .bind(project_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Time entry", id))?;

        Ok(TimeEntry::from(row))
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM time_entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Time entry", id));
        }

        Ok(())
    }

    async fn has_unassigned(&self, employee_id: Id) -> RepositoryResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM time_entries WHERE employee_id = $1 AND project_id IS NULL)",
        )
        .bind(employee_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
