//! API error handling
//!
//! Turns service failures into JSON error bodies with the matching status.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;
use tt_core::error::{TtError, ValidationErrors};

/// API error types
#[derive(Debug)]
pub enum ApiError {
    NotFound { resource: &'static str },
    Validation(ValidationErrors),
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn identifier(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "urn:time-tracker:errors:NotFound",
            ApiError::Validation(_) => "urn:time-tracker:errors:PropertyConstraintViolation",
            ApiError::Unauthorized(_) => "urn:time-tracker:errors:Unauthenticated",
            ApiError::Forbidden(_) => "urn:time-tracker:errors:MissingPermission",
            ApiError::BadRequest(_) => "urn:time-tracker:errors:InvalidRequestBody",
            ApiError::Conflict(_) => "urn:time-tracker:errors:Conflict",
            ApiError::Internal(_) => "urn:time-tracker:errors:InternalError",
        }
    }
}

impl From<TtError> for ApiError {
    fn from(err: TtError) -> Self {
        match err {
            TtError::NotFound { entity, .. } => ApiError::NotFound { resource: entity },
            TtError::Validation(errors) => ApiError::Validation(errors),
            TtError::Unauthorized { message } => ApiError::Unauthorized(message),
            TtError::Forbidden { message } => ApiError::Forbidden(message),
            TtError::Conflict { message } => ApiError::Conflict(message),
            other => {
                error!(error = %other, code = other.error_code(), "Request failed");
                ApiError::Internal(other.user_message())
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    #[serde(rename = "_type")]
    type_name: &'static str,
    #[serde(rename = "errorIdentifier")]
    error_identifier: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<BTreeMap<String, Vec<String>>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_identifier = self.identifier();
        let (message, errors) = match self {
            ApiError::NotFound { resource } => (format!("{} not found", resource), None),
            ApiError::Validation(errors) => (errors.full_messages().join(", "), Some(errors.errors)),
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => (msg, None),
        };

        let body = ErrorBody {
            type_name: "Error",
            error_identifier,
            message,
            errors,
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
