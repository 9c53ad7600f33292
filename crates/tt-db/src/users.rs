//! User repository
//!
//! Database operations for user accounts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tt_core::traits::Id;
use tt_models::{Role, User};

use crate::repository::{decode_label, RepositoryError, RepositoryResult};

/// User database row
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            first_name: row.first_name,
            last_name: row.last_name,
            role: decode_label(&row.role)?,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

/// Insert parameters for a user; the password is already hashed
#[derive(Debug, Clone)]
pub struct CreateUserDto {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

pub(crate) const DUPLICATE_EMAIL: &str = "A user with this email already exists";

/// User persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<User>>;

    /// Case-insensitive email lookup
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    /// Insert a standalone user; duplicate email yields `Conflict`
    async fn create(&self, dto: CreateUserDto) -> RepositoryResult<User>;

    async fn count(&self) -> RepositoryResult<i64>;
}

/// PostgreSQL user repository
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) const USER_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, role, is_active, created_at";

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::try_from).transpose()?)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::try_from).transpose()?)
    }

    async fn create(&self, dto: CreateUserDto) -> RepositoryResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, role, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, TRUE, NOW())
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(dto.email.trim())
        .bind(&dto.password_hash)
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(dto.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_on_constraint(e, DUPLICATE_EMAIL))?;

        Ok(User::try_from(row)?)
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
