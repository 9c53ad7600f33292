//! Project contract

use tt_core::error::ValidationErrors;
use tt_models::{Client, EmployeeProfile, ProjectForm, Role};

use crate::base::{collect_shape_errors, validate_present, Contract, ValidationResult};

/// Contract for creating and editing projects
///
/// The referenced manager and client are looked up by the caller and handed
/// in; `None` means the id did not resolve.
pub struct ProjectContract<'a> {
    manager: Option<&'a EmployeeProfile>,
    client: Option<&'a Client>,
}

impl<'a> ProjectContract<'a> {
    pub fn new(manager: Option<&'a EmployeeProfile>, client: Option<&'a Client>) -> Self {
        Self { manager, client }
    }

    /// The manager must exist and hold the Manager role
    pub fn validate_manager(&self, errors: &mut ValidationErrors) {
        match self.manager {
            None => errors.add("manager_id", "does not exist"),
            Some(m) if m.role != Role::Manager => {
                errors.add("manager_id", "must be an employee with the Manager role")
            }
            Some(_) => {}
        }
    }

    pub fn validate_client(&self, errors: &mut ValidationErrors) {
        if self.client.is_none() {
            errors.add("client_id", "does not exist");
        }
    }

    pub fn validate_dates(&self, form: &ProjectForm, errors: &mut ValidationErrors) {
        if let Some(end) = form.end_date {
            if end < form.start_date {
                errors.add("end_date", "must not be before the start date");
            }
        }
    }
}

impl Contract<ProjectForm> for ProjectContract<'_> {
    fn validate(&self, form: &ProjectForm) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        collect_shape_errors(form, &mut errors);
        validate_present("name", &form.name, &mut errors);
        self.validate_dates(form, &mut errors);
        self.validate_manager(&mut errors);
        self.validate_client(&mut errors);

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn profile(role: Role) -> EmployeeProfile {
        EmployeeProfile {
            id: 2,
            user_id: 2,
            first_name: "Jan".into(),
            last_name: "Kierownik".into(),
            email: "manager@test.com".into(),
            role,
            position: "Project Manager".into(),
            department: "Management".into(),
            hire_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            is_active: true,
        }
    }

    fn client() -> Client {
        Client {
            id: 1,
            name: "ABC Corporation".into(),
            description: None,
            email: None,
            phone: None,
            address: None,
            city: None,
            postal_code: None,
            country: None,
            nip: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
            lock_version: 0,
        }
    }

    fn form() -> ProjectForm {
        ProjectForm::new("System CRM", 2, 1, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
    }

    #[test]
    fn test_valid_project() {
        let manager = profile(Role::Manager);
        let client = client();
        let contract = ProjectContract::new(Some(&manager), Some(&client));
        assert!(contract.validate(&form()).is_ok());
    }

    #[test]
    fn test_manager_must_hold_manager_role() {
        let not_manager = profile(Role::Employee);
        let client = client();
        let contract = ProjectContract::new(Some(&not_manager), Some(&client));
        let errors = contract.validate(&form()).unwrap_err();
        assert!(errors.has_error("manager_id"));

        let admin = profile(Role::Admin);
        let contract = ProjectContract::new(Some(&admin), Some(&client));
        assert!(contract.validate(&form()).is_err());
    }

    #[test]
    fn test_missing_references() {
        let contract = ProjectContract::new(None, None);
        let errors = contract.validate(&form()).unwrap_err();
        assert!(errors.has_error("manager_id"));
        assert!(errors.has_error("client_id"));
    }

    #[test]
    fn test_blank_name_and_reversed_dates() {
        let manager = profile(Role::Manager);
        let client = client();
        let contract = ProjectContract::new(Some(&manager), Some(&client));
        let mut f = form();
        f.name = "   ".into();
        f.end_date = NaiveDate::from_ymd_opt(2024, 12, 1);
        let errors = contract.validate(&f).unwrap_err();
        assert!(errors.has_error("name"));
        assert!(errors.has_error("end_date"));
    }
}
