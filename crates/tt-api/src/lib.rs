//! # tt-api
//!
//! JSON HTTP handlers for the time tracker.
//!
//! Handlers authenticate through the session cookie, hand the request to a
//! service from `tt-services` and map `TtError` onto HTTP statuses.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use error::{ApiError, ApiResult};
pub use extractors::{AppState, AuthenticatedUser};
pub use routes::router;
