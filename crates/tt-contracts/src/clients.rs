//! Client contract

use tt_core::error::ValidationErrors;
use tt_models::ClientForm;

use crate::base::{collect_shape_errors, validate_present, Contract, ValidationResult};

pub struct ClientContract;

impl Contract<ClientForm> for ClientContract {
    fn validate(&self, form: &ClientForm) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        collect_shape_errors(form, &mut errors);
        validate_present("name", &form.name, &mut errors);
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_contract() {
        assert!(ClientContract.validate(&ClientForm::new("Miasto Poznań")).is_ok());
        let errors = ClientContract.validate(&ClientForm::new("  ")).unwrap_err();
        assert_eq!(errors.get("name").unwrap(), &vec!["can't be blank".to_string()]);
    }
}
