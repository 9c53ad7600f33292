//! Project repository
//!
//! Projects and their employee assignments (`employee_projects`).

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tt_core::traits::Id;
use tt_models::{Project, ProjectFilter, ProjectForm};

use crate::repository::{decode_label, like_pattern, RepositoryError, RepositoryResult};

/// Project database row
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub hours_budget: Option<f64>,
    pub manager_id: i64,
    pub client_id: i64,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = sqlx::Error;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Project {
            id: row.id,
            name: row.name,
            description: row.description,
            status: decode_label(&row.status)?,
            start_date: row.start_date,
            end_date: row.end_date,
            is_active: row.is_active,
            hours_budget: row.hours_budget,
            manager_id: row.manager_id,
            client_id: row.client_id,
            created_at: row.created_at,
        })
    }
}

/// Column list for queries aliasing `projects` as `p`
pub(crate) const PROJECT_COLUMNS: &str = "p.id, p.name, p.description, p.status, p.start_date, \
     p.end_date, p.is_active, p.hours_budget, p.manager_id, p.client_id, p.created_at";

/// Project persistence
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Project>>;

    /// Filtered list ordered by name
    async fn list(&self, filter: &ProjectFilter) -> RepositoryResult<Vec<Project>>;

    /// Insert the project and its assignments atomically
    async fn create(&self, form: &ProjectForm) -> RepositoryResult<Project>;

    /// Overwrite the project and replace its assignment set atomically
    async fn update(&self, id: Id, form: &ProjectForm) -> RepositoryResult<Project>;

    /// Fails with `Conflict` while time entries reference the project
    async fn delete(&self, id: Id) -> RepositoryResult<()>;

    async fn assigned_employee_ids(&self, project_id: Id) -> RepositoryResult<Vec<Id>>;

    async fn count_entries(&self, project_id: Id) -> RepositoryResult<i64>;
}

pub(crate) const PROJECT_HAS_ENTRIES: &str =
    "Cannot delete a project that has time entries. Remove or reassign the entries first.";

/// PostgreSQL project repository
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn replace_assignments(
        tx: &mut Transaction<'_, Postgres>,
        project_id: Id,
        employee_ids: &[Id],
    ) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM employee_projects WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut **tx)
            .await?;

        if !employee_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO employee_projects (employee_id, project_id)
                SELECT DISTINCT unnest($1::BIGINT[]), $2
                "#,
            )
            .bind(employee_ids)
            .bind(project_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                RepositoryError::conflict_on_constraint(e, "One of the assigned employees does not exist")
            })?;
        }

        Ok(())
    }
}

#[async_trait]
impl ProjectStore for ProjectRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {} FROM projects p WHERE p.id = $1",
            PROJECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Project::try_from).transpose()?)
    }

    async fn list(&self, filter: &ProjectFilter) -> RepositoryResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            r#"
            SELECT {}
            FROM projects p
            WHERE ($1::TEXT IS NULL OR p.name ILIKE $1)
              AND ($2::BIGINT IS NULL OR p.manager_id = $2)
              AND ($3::TEXT IS NULL OR p.status = $3)
              AND ($4::BIGINT IS NULL OR p.client_id = $4)
            ORDER BY p.name, p.id
            "#,
            PROJECT_COLUMNS
        ))
        .bind(filter.name.as_deref().map(like_pattern))
        .bind(filter.manager_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.client_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| Project::try_from(r).map_err(RepositoryError::from))
            .collect()
    }

    async fn create(&self, form: &ProjectForm) -> RepositoryResult<Project> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            r#"
            INSERT INTO projects AS p (
                name, description, status, start_date, end_date, is_active,
                hours_budget, manager_id, client_id, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            RETURNING {}
            "#,
            PROJECT_COLUMNS
        ))
        .bind(form.name.trim())
        .bind(&form.description)
        .bind(form.status.as_str())
        .bind(form.start_date)
        .bind(form.end_date)
        .bind(form.is_active)
        .bind(form.hours_budget)
        .bind(form.manager_id)
        .bind(form.client_id)
        .fetch_one(&mut *tx)
        .await?;

        Self::replace_assignments(&mut tx, row.id, &form.employee_ids).await?;
        tx.commit().await?;

        tracing::debug!(project_id = row.id, assigned = form.employee_ids.len(), "Project created");
        Ok(Project::try_from(row)?)
    }

    async fn update(&self, id: Id, form: &ProjectForm) -> RepositoryResult<Project> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            r#"
            UPDATE projects AS p SET
                name = $1,
                description = $2,
                status = $3,
                start_date = $4,
                end_date = $5,
                is_active = $6,
                hours_budget = $7,
                manager_id = $8,
                client_id = $9
            WHERE p.id = $10
            RETURNING {}
            "#,
            PROJECT_COLUMNS
        ))
        .bind(form.name.trim())
        .bind(&form.description)
        .bind(form.status.as_str())
        .bind(form.start_date)
        .bind(form.end_date)
        .bind(form.is_active)
        .bind(form.hours_budget)
        .bind(form.manager_id)
        .bind(form.client_id)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Project", id))?;

        Self::replace_assignments(&mut tx, id, &form.employee_ids).await?;
        tx.commit().await?;

        Ok(Project::try_from(row)?)
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        let entries = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM time_entries WHERE project_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if entries > 0 {
            return Err(RepositoryError::Conflict(PROJECT_HAS_ENTRIES.to_string()));
        }

        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::conflict_on_constraint(e, PROJECT_HAS_ENTRIES))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Project", id));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn assigned_employee_ids(&self, project_id: Id) -> RepositoryResult<Vec<Id>> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT employee_id FROM employee_projects WHERE project_id = $1 ORDER BY employee_id",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn count_entries(&self, project_id: Id) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM time_entries WHERE project_id = $1")
            .bind(project_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
