//! Result type aliases

use crate::error::{TtError, ValidationErrors};

/// Standard Result type for time tracker operations
pub type TtResult<T> = Result<T, TtError>;

/// Result of running a contract or a model validation
pub type ValidationResult = Result<(), ValidationErrors>;
