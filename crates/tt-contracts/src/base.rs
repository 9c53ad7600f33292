//! Base contract system

use tt_core::error::ValidationErrors;
pub use tt_core::result::ValidationResult;
use validator::Validate;

/// Base contract trait
pub trait Contract<T>: Send + Sync {
    /// Validate the entity
    fn validate(&self, entity: &T) -> ValidationResult;
}

/// Run the derive-based shape checks of `input` into `errors`
pub fn collect_shape_errors<T: Validate>(input: &T, errors: &mut ValidationErrors) {
    if let Err(e) = input.validate() {
        errors.merge(e.into());
    }
}

/// Blank-after-trim check shared by every named entity
pub fn validate_present(field: &str, value: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() && !errors.has_error(field) {
        errors.add(field, "can't be blank");
    }
}
