//! Repository error type and shared helpers

use tt_core::error::TtError;

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl RepositoryError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        RepositoryError::NotFound(format!("{} with id {} not found", entity, id))
    }

    /// Map unique and foreign key violations to `Conflict` with `message`
    pub fn conflict_on_constraint(err: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() || db.is_foreign_key_violation() {
                return RepositoryError::Conflict(message.to_string());
            }
        }
        RepositoryError::Database(err)
    }
}

impl From<RepositoryError> for TtError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(message) => TtError::NotFound {
                entity: "Record",
                field: "id",
                value: message,
            },
            RepositoryError::Conflict(message) => TtError::Conflict { message },
            RepositoryError::Database(e) => {
                tracing::error!(error = %e, "Database operation failed");
                TtError::Database(e.to_string())
            }
        }
    }
}

/// Turn a stored enum label back into its type, reporting bad data as a decode error
pub(crate) fn decode_label<T>(value: &str) -> Result<T, sqlx::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .map_err(|e: T::Err| sqlx::Error::Decode(Box::new(e)))
}

/// `%term%` pattern for ILIKE filters with wildcards escaped
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
