//! Authentication errors

use thiserror::Error;
use tt_core::error::TtError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Session expired")]
    SessionExpired,

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

impl From<AuthError> for TtError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Hashing(message) => TtError::Internal(message),
            other => TtError::Unauthorized {
                message: other.to_string(),
            },
        }
    }
}
