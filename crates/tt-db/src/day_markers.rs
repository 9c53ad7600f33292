//! Day marker repository
//!
//! One marker per (employee, date); writes are upserts.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use tt_core::traits::Id;
use tt_models::{DayMarker, DayMarkerUpsert};

use crate::repository::{decode_label, RepositoryError, RepositoryResult};

/// Day marker database row
#[derive(Debug, Clone, FromRow)]
pub struct DayMarkerRow {
    pub id: i64,
    pub employee_id: i64,
    pub date: NaiveDate,
    pub marker_type: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<i64>,
}

impl TryFrom<DayMarkerRow> for DayMarker {
    type Error = sqlx::Error;

    fn try_from(row: DayMarkerRow) -> Result<Self, Self::Error> {
        Ok(DayMarker {
            id: row.id,
            employee_id: row.employee_id,
            date: row.date,
            marker_type: decode_label(&row.marker_type)?,
            note: row.note,
            created_at: row.created_at,
            created_by: row.created_by,
        })
    }
}

const MARKER_COLUMNS: &str = "id, employee_id, date, marker_type, note, created_at, created_by";

/// Day marker persistence
#[async_trait]
pub trait DayMarkerStore: Send + Sync {
    /// Markers of one employee in `[from, to]`, ordered by date
    async fn list(&self, employee_id: Id, from: NaiveDate, to: NaiveDate) -> RepositoryResult<Vec<DayMarker>>;

    async fn find(&self, employee_id: Id, date: NaiveDate) -> RepositoryResult<Option<DayMarker>>;

    /// Overwrite type and note of the existing marker, or insert a new one
    async fn upsert(&self, marker: &DayMarkerUpsert) -> RepositoryResult<DayMarker>;

    /// Returns whether a marker was removed
    async fn remove(&self, employee_id: Id, date: NaiveDate) -> RepositoryResult<bool>;
}

/// PostgreSQL day marker repository
pub struct DayMarkerRepository {
    pool: PgPool,
}

impl DayMarkerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DayMarkerStore for DayMarkerRepository {
    async fn list(&self, employee_id: Id, from: NaiveDate, to: NaiveDate) -> RepositoryResult<Vec<DayMarker>> {
        let rows = sqlx::query_as::<_, DayMarkerRow>(&format!(
            r#"
            SELECT {}
            FROM day_markers
            WHERE employee_id = $1 AND date BETWEEN $2 AND $3
            ORDER BY date
            "#,
            MARKER_COLUMNS
        ))
        .bind(employee_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| DayMarker::try_from(r).map_err(RepositoryError::from))
            .collect()
    }

    async fn find(&self, employee_id: Id, date: NaiveDate) -> RepositoryResult<Option<DayMarker>> {
        let row = sqlx::query_as::<_, DayMarkerRow>(&format!(
            "SELECT {} FROM day_markers WHERE employee_id = $1 AND date = $2",
            MARKER_COLUMNS
        ))
        .bind(employee_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(DayMarker::try_from).transpose()?)
    }

    async fn upsert(&self, marker: &DayMarkerUpsert) -> RepositoryResult<DayMarker> {
        let row = sqlx::query_as::<_, DayMarkerRow>(&format!(
            r#"
            INSERT INTO day_markers (employee_id, date, marker_type, note, created_at, created_by)
            VALUES ($1, $2, $3, $4, NOW(), $5)
            ON CONFLICT (employee_id, date) DO UPDATE SET
                marker_type = EXCLUDED.marker_type,
                note = EXCLUDED.note
            RETURNING {}
            "#,
            MARKER_COLUMNS
        ))
        .bind(marker.employee_id)
        .bind(marker.date)
        .bind(marker.marker_type.as_str())
        .bind(&marker.note)
        .bind(marker.created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(DayMarker::try_from(row)?)
    }

    async fn remove(&self, employee_id: Id, date: NaiveDate) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM day_markers WHERE employee_id = $1 AND date = $2")
            .bind(employee_id)
            .bind(date)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
