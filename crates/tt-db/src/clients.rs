//! Client repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tt_core::traits::Id;
use tt_models::{Client, ClientFilter, ClientForm};

use crate::repository::{like_pattern, RepositoryError, RepositoryResult};

/// Client database row
#[derive(Debug, Clone, FromRow)]
pub struct ClientRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub nip: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub lock_version: i32,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: row.id,
            name: row.name,
            description: row.description,
            email: row.email,
            phone: row.phone,
            address: row.address,
            city: row.city,
            postal_code: row.postal_code,
            country: row.country,
            nip: row.nip,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
            lock_version: row.lock_version,
        }
    }
}

const CLIENT_COLUMNS: &str = "id, name, description, email, phone, address, city, postal_code, \
     country, nip, is_active, created_at, updated_at, lock_version";

pub(crate) const CLIENT_HAS_PROJECTS: &str =
    "Cannot delete a client that still has projects. Delete or move the projects first.";

pub(crate) const STALE_CLIENT: &str =
    "The client was modified by someone else. Reload it and apply your changes again.";

/// Client persistence
#[async_trait]
pub trait ClientStore: Send + Sync {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Client>>;

    /// Filtered list ordered by name
    async fn list(&self, filter: &ClientFilter) -> RepositoryResult<Vec<Client>>;

    async fn create(&self, form: &ClientForm) -> RepositoryResult<Client>;

    /// Overwrite the client if its stored `lock_version` still equals
    /// `expected_version`; otherwise `Conflict`
    async fn update(&self, id: Id, form: &ClientForm, expected_version: i32) -> RepositoryResult<Client>;

    /// Fails with `Conflict` while the client owns projects
    async fn delete(&self, id: Id) -> RepositoryResult<()>;
}

/// PostgreSQL client repository
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientStore for ClientRepository {
    async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Client>> {
        let row = sqlx::query_as::<_, ClientRow>(&format!("SELECT {} FROM clients WHERE id = $1", CLIENT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Client::from))
    }

    async fn list(&self, filter: &ClientFilter) -> RepositoryResult<Vec<Client>> {
        let rows = sqlx::query_as::<_, ClientRow>(&format!(
            r#"
            SELECT {}
            FROM clients
            WHERE ($1::TEXT IS NULL OR name ILIKE $1)
            ORDER BY name, id
            "#,
            CLIENT_COLUMNS
        ))
        .bind(filter.name.as_deref().map(like_pattern))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Client::from).collect())
    }

    async fn create(&self, form: &ClientForm) -> RepositoryResult<Client> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            r#"
            INSERT INTO clients (
                name, description, email, phone, address, city, postal_code,
                country, nip, is_active, created_at, lock_version
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW(), 0)
            RETURNING {}
            "#,
            CLIENT_COLUMNS
        ))
        .bind(form.name.trim())
        .bind(&form.description)
        .bind(&form.email)
        .bind(&form.phone)
        .bind(&form.address)
        .bind(&form.city)
        .bind(&form.postal_code)
        .bind(&form.country)
        .bind(&form.nip)
        .bind(form.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(Client::from(row))
    }

    async fn update(&self, id: Id, form: &ClientForm, expected_version: i32) -> RepositoryResult<Client> {
        let row = sqlx::query_as::<_, ClientRow>(&format!(
            r#"
            UPDATE clients SET
                name = $1,
                description = $2,
                email = $3,
                phone = $4,
                address = $5,
                city = $6,
                postal_code = $7,
                country = $8,
                nip = $9,
                is_active = $10,
                updated_at = NOW(),
                lock_version = lock_version + 1
            WHERE id = $11 AND lock_version = $12
            RETURNING {}
            "#,
            CLIENT_COLUMNS
        ))
        .bind(form.name.trim())
        .bind(&form.description)
        .bind(&form.email)
        .bind(&form.phone)
        .bind(&form.address)
        .bind(&form.city)
        .bind(&form.postal_code)
        .bind(&form.country)
        .bind(&form.nip)
        .bind(form.is_active)
        .bind(id)
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Client::from(row)),
            None => {
                let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await?;
                if exists {
                    Err(RepositoryError::Conflict(STALE_CLIENT.to_string()))
                } else {
                    Err(RepositoryError::not_found("Client", id))
                }
            }
        }
    }

    async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        let projects = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects WHERE client_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if projects > 0 {
            return Err(RepositoryError::Conflict(CLIENT_HAS_PROJECTS.to_string()));
        }

        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::conflict_on_constraint(e, CLIENT_HAS_PROJECTS))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Client", id));
        }

        tx.commit().await?;
        Ok(())
    }
}
