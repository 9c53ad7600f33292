//! Employee repository
//!
//! Employee profiles are always read joined with their user so callers get
//! names and role in one flat row.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};
use tt_core::traits::Id;
use tt_models::{EmployeeProfile, Project, UpdateEmployee, UpdateUser};

use crate::projects::{ProjectRow, PROJECT_COLUMNS};
use crate::repository::{decode_label, RepositoryError, RepositoryResult};
use crate::users::{CreateUserDto, DUPLICATE_EMAIL};

/// Employee joined with user columns
#[derive(Debug, Clone, FromRow)]
pub struct EmployeeProfileRow {
    pub id: i64,
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub position: String,
    pub department: String,
    pub hire_date: NaiveDate,
    pub is_active: bool,
}

impl TryFrom<EmployeeProfileRow> for EmployeeProfile {
    type Error = sqlx::Error;

    fn try_from(row: EmployeeProfileRow) -> Result<Self, Self::Error> {
        Ok(EmployeeProfile {
            id: row.id,
            user_id: row.user_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            role: decode_label(&row.role)?,
            position: row.position,
            department: row.department,
            hire_date: row.hire_date,
            is_active: row.is_active,
        })
    }
}

/// Employee half of an onboarding insert
#[derive(Debug, Clone)]
pub struct CreateEmployeeDto {
    pub position: String,
    pub department: String,
    pub hire_date: NaiveDate,
}

/// Employee persistence
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<EmployeeProfile>>;

    async fn find_by_user(&self, user_id: Id) -> RepositoryResult<Option<EmployeeProfile>>;

    /// Ordered by last name, then first name
    async fn list(&self, active_only: bool) -> RepositoryResult<Vec<EmployeeProfile>>;

    /// Insert the user and its employee profile atomically
    async fn create_with_user(
        &self,
        user: CreateUserDto,
        employee: CreateEmployeeDto,
    ) -> RepositoryResult<EmployeeProfile>;

    /// Partial update of both halves atomically
    async fn update(
        &self,
        id: Id,
        user: UpdateUser,
        employee: UpdateEmployee,
    ) -> RepositoryResult<EmployeeProfile>;

    /// Clear the active flag on the employee and its user
    async fn deactivate(&self, id: Id) -> RepositoryResult<()>;

    /// Projects the employee is assigned to, ordered by name
    async fn assigned_projects(&self, employee_id: Id) -> RepositoryResult<Vec<Project>>;

    async fn is_assigned(&self, employee_id: Id, project_id: Id) -> RepositoryResult<bool>;
}

/// PostgreSQL employee repository
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PROFILE_SELECT: &str = r#"
    SELECT e.id, e.user_id, u.first_name, u.last_name, u.email, u.role,
           e.position, e.department, e.hire_date, e.is_active
    FROM employees e
    JOIN users u ON u.id = e.user_id
"#;

impl EmployeeRepository {
    async fn fetch_profile<'c, E>(executor: E, id: Id) -> RepositoryResult<EmployeeProfile>
    where
        E: sqlx::PgExecutor<'c>,
    {
        let row = sqlx::query_as::<_, EmployeeProfileRow>(&format!("{} WHERE e.id = $1", PROFILE_SELECT))
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Employee", id))?;

        Ok(EmployeeProfile::try_from(row)?)
    }
}

#[async_trait]
impl EmployeeStore for EmployeeRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<EmployeeProfile>> {
        let row = sqlx::query_as::<_, EmployeeProfileRow>(&format!("{} WHERE e.id = $1", PROFILE_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(EmployeeProfile::try_from).transpose()?)
    }

    async fn find_by_user(&self, user_id: Id) -> RepositoryResult<Option<EmployeeProfile>> {
        let row = sqlx::query_as::<_, EmployeeProfileRow>(&format!("{} WHERE e.user_id = $1", PROFILE_SELECT))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(EmployeeProfile::try_from).transpose()?)
    }

    async fn list(&self, active_only: bool) -> RepositoryResult<Vec<EmployeeProfile>> {
        let rows = sqlx::query_as::<_, EmployeeProfileRow>(&format!(
            "{} WHERE ($1 = FALSE OR e.is_active) ORDER BY u.last_name, u.first_name, e.id",
            PROFILE_SELECT
        ))
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| EmployeeProfile::try_from(r).map_err(RepositoryError::from))
            .collect()
    }

    async fn create_with_user(
        &self,
        user: CreateUserDto,
        employee: CreateEmployeeDto,
    ) -> RepositoryResult<EmployeeProfile> {
        let mut tx = self.pool.begin().await?;

        let user_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, role, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, TRUE, NOW())
            RETURNING id
            "#,
        )
        .bind(user.email.trim())
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::conflict_on_constraint(e, DUPLICATE_EMAIL))?;

        let employee_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO employees (user_id, position, department, hire_date, is_active)
            VALUES ($1, $2, $3, $4, TRUE)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(&employee.position)
        .bind(&employee.department)
        .bind(employee.hire_date)
        .fetch_one(&mut *tx)
        .await?;

        let profile = Self::fetch_profile(&mut *tx, employee_id).await?;
        tx.commit().await?;

        Ok(profile)
    }

    async fn update(
        &self,
        id: Id,
        user: UpdateUser,
        employee: UpdateEmployee,
    ) -> RepositoryResult<EmployeeProfile> {
        let mut tx = self.pool.begin().await?;

        let user_id = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE employees SET
                position = COALESCE($1, position),
                department = COALESCE($2, department),
                hire_date = COALESCE($3, hire_date)
            WHERE id = $4
            RETURNING user_id
            "#,
        )
        .bind(&employee.position)
        .bind(&employee.department)
        .bind(employee.hire_date)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Employee", id))?;

        sqlx::query(
            r#"
            UPDATE users SET
                email = COALESCE($1, email),
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                role = COALESCE($4, role)
            WHERE id = $5
            "#,
        )
        .bind(user.email.as_deref().map(str::trim))
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role.map(|r| r.as_str()))
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::conflict_on_constraint(e, DUPLICATE_EMAIL))?;

        let profile = Self::fetch_profile(&mut *tx, id).await?;
        tx.commit().await?;

        Ok(profile)
    }

    async fn deactivate(&self, id: Id) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        let user_id = sqlx::query_scalar::<_, i64>(
            "UPDATE employees SET is_active = FALSE WHERE id = $1 RETURNING user_id",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Employee", id))?;

        sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn assigned_projects(&self, employee_id: Id) -> RepositoryResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            r#"
            SELECT {}
            FROM projects p
            JOIN employee_projects ep ON ep.project_id = p.id
            WHERE ep.employee_id = $1
            ORDER BY p.name
            "#,
            PROJECT_COLUMNS
        ))
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| Project::try_from(r).map_err(RepositoryError::from))
            .collect()
    }

    async fn is_assigned(&self, employee_id: Id, project_id: Id) -> RepositoryResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM employee_projects WHERE employee_id = $1 AND project_id = $2)",
        )
        .bind(employee_id)
        .bind(project_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
