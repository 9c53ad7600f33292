//! Employee onboarding and edit contracts

use serde::Deserialize;
use tt_core::error::ValidationErrors;
use tt_models::{NewEmployee, NewUser, UpdateEmployee, UpdateUser};

use crate::base::{collect_shape_errors, validate_present, Contract, ValidationResult};

/// User account plus employee profile, created together
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEmployeeParams {
    #[serde(flatten)]
    pub user: NewUser,
    #[serde(flatten)]
    pub employee: NewEmployee,
}

/// Edit of both halves of an employee record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEmployeeParams {
    #[serde(flatten)]
    pub user: UpdateUser,
    #[serde(flatten)]
    pub employee: UpdateEmployee,
}

pub struct CreateEmployeeContract;

impl Contract<CreateEmployeeParams> for CreateEmployeeContract {
    fn validate(&self, params: &CreateEmployeeParams) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        collect_shape_errors(&params.user, &mut errors);
        collect_shape_errors(&params.employee, &mut errors);
        validate_present("first_name", &params.user.first_name, &mut errors);
        validate_present("last_name", &params.user.last_name, &mut errors);
        validate_present("position", &params.employee.position, &mut errors);
        validate_present("department", &params.employee.department, &mut errors);
        errors.into_result()
    }
}

pub struct UpdateEmployeeContract;

impl Contract<UpdateEmployeeParams> for UpdateEmployeeContract {
    fn validate(&self, params: &UpdateEmployeeParams) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        collect_shape_errors(&params.user, &mut errors);
        collect_shape_errors(&params.employee, &mut errors);
        errors.into_result()
    }
}

/// Self-registration: the account shape only
pub struct RegistrationContract;

impl Contract<NewUser> for RegistrationContract {
    fn validate(&self, user: &NewUser) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        collect_shape_errors(user, &mut errors);
        validate_present("first_name", &user.first_name, &mut errors);
        validate_present("last_name", &user.last_name, &mut errors);
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_params_from_flat_json() {
        let params: CreateEmployeeParams = serde_json::from_str(
            r#"{
                "email": "new@test.com",
                "first_name": "Anna",
                "last_name": "Nowak",
                "password": "Secret123!",
                "role": "employee",
                "position": "Tester",
                "department": "QA"
            }"#,
        )
        .unwrap();
        assert_eq!(params.employee.position, "Tester");
        assert!(CreateEmployeeContract.validate(&params).is_ok());
    }

    #[test]
    fn test_create_requires_fields() {
        let params: CreateEmployeeParams = serde_json::from_str(
            r#"{
                "email": "bad",
                "first_name": " ",
                "last_name": "Nowak",
                "password": "123",
                "position": "",
                "department": "QA"
            }"#,
        )
        .unwrap();
        let errors = CreateEmployeeContract.validate(&params).unwrap_err();
        assert!(errors.has_error("email"));
        assert!(errors.has_error("first_name"));
        assert!(errors.has_error("password"));
        assert!(errors.has_error("position"));
    }

    #[test]
    fn test_update_params_partial() {
        let params: UpdateEmployeeParams =
            serde_json::from_str(r#"{"position": "Lead Developer"}"#).unwrap();
        assert_eq!(params.employee.position.as_deref(), Some("Lead Developer"));
        assert!(params.user.email.is_none());
        assert!(UpdateEmployeeContract.validate(&params).is_ok());
    }
}
