//! Core error types for the time tracker
//!
//! Every fallible domain operation ends in a `TtError`; field-level validation
//! failures are carried by `ValidationErrors`.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Core error type for all time tracker operations
#[derive(Error, Debug)]
pub enum TtError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TtError {
    /// Missing record looked up by primary key
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        TtError::NotFound {
            entity,
            field: "id",
            value: id.to_string(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        TtError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        TtError::Forbidden {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        TtError::Conflict {
            message: message.into(),
        }
    }

    /// Single field validation failure
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        TtError::Validation(errors)
    }

    pub fn status_code(&self) -> u16 {
        match self {
            TtError::NotFound { .. } => 404,
            TtError::Unauthorized { .. } => 401,
            TtError::Forbidden { .. } => 403,
            TtError::Validation(_) => 422,
            TtError::Conflict { .. } => 409,
            TtError::Database(_) | TtError::Internal(_) | TtError::Config(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            TtError::NotFound { .. } => "not_found",
            TtError::Unauthorized { .. } => "unauthorized",
            TtError::Forbidden { .. } => "forbidden",
            TtError::Validation(_) => "validation_failed",
            TtError::Conflict { .. } => "conflict",
            TtError::Database(_) => "database_error",
            TtError::Internal(_) => "internal_error",
            TtError::Config(_) => "configuration_error",
        }
    }

    /// Message safe to show to the caller.
    ///
    /// Storage and internal failures are collapsed to a generic text so that
    /// no query or schema detail leaks out.
    pub fn user_message(&self) -> String {
        match self {
            TtError::NotFound { entity, .. } => format!("{} not found", entity),
            TtError::Unauthorized { message }
            | TtError::Forbidden { message }
            | TtError::Conflict { message } => message.clone(),
            TtError::Validation(errors) => errors.full_messages().join(", "),
            TtError::Database(_) | TtError::Internal(_) | TtError::Config(_) => {
                "An internal error occurred".to_string()
            }
        }
    }
}

/// Validation errors collection keyed by field name
#[derive(Error, Debug, Default, Clone, PartialEq, Serialize)]
#[error("Validation errors: {errors:?}")]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> messages
    pub errors: BTreeMap<String, Vec<String>>,
    /// Errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    /// Check if there are errors for a specific field
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Get errors for a specific field
    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        for (field, field_messages) in &self.errors {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }

    /// `Ok(())` when nothing was collected
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(errs: validator::ValidationErrors) -> Self {
        let mut errors = ValidationErrors::new();
        for (field, field_errors) in errs.field_errors() {
            for err in field_errors {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("is invalid ({})", err.code));
                errors.add(field.to_string(), message);
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_collect() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());

        errors.add("end_time", "must be after start time");
        errors.add_base("something went wrong");

        assert!(errors.has_error("end_time"));
        assert!(!errors.has_error("start_time"));
        assert_eq!(
            errors.full_messages(),
            vec![
                "something went wrong".to_string(),
                "end_time must be after start time".to_string()
            ]
        );
    }

    #[test]
    fn test_merge() {
        let mut a = ValidationErrors::new();
        a.add("name", "can't be blank");
        let mut b = ValidationErrors::new();
        b.add("name", "is too long");
        b.add("email", "is invalid");

        a.merge(b);
        assert_eq!(a.get("name").map(|v| v.len()), Some(2));
        assert!(a.has_error("email"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(TtError::not_found("Project", 1).status_code(), 404);
        assert_eq!(TtError::forbidden("no").status_code(), 403);
        assert_eq!(TtError::invalid("end_time", "bad").status_code(), 422);
        assert_eq!(TtError::conflict("dup").status_code(), 409);
        assert_eq!(TtError::Database("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = TtError::Database("relation \"users\" does not exist".into());
        assert_eq!(err.user_message(), "An internal error occurred");
        assert_eq!(
            TtError::not_found("Time entry", 7).user_message(),
            "Time entry not found"
        );
    }
}
