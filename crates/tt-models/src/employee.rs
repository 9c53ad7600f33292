//! Employee model
//!
//! Table: employees (1:1 with users), employee_projects (assignments)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tt_core::traits::{Entity, Id, Identifiable};
use validator::Validate;

use crate::role::Role;

/// Employee profile attached to exactly one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Id,
    pub user_id: Id,
    pub position: String,
    pub department: String,
    pub hire_date: NaiveDate,
    pub is_active: bool,
}

impl Identifiable for Employee {
    fn id(&self) -> Id {
        self.id
    }
}

impl Entity for Employee {
    const TABLE_NAME: &'static str = "employees";
    const TYPE_NAME: &'static str = "Employee";
}

/// Employee joined with the owning user's identity columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub id: Id,
    pub user_id: Id,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub position: String,
    pub department: String,
    pub hire_date: NaiveDate,
    pub is_active: bool,
}

impl EmployeeProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Sort order used by every employee picker: last name, then first name
    pub fn sort_by_name(profiles: &mut [EmployeeProfile]) {
        profiles.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
        });
    }
}

impl Identifiable for EmployeeProfile {
    fn id(&self) -> Id {
        self.id
    }
}

/// Employee fields supplied when onboarding
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewEmployee {
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub position: String,

    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub department: String,

    /// Defaults to today when omitted
    pub hire_date: Option<NaiveDate>,
}

/// Employee update parameters
#[derive(Debug, Clone, Deserialize, Default, Validate)]
pub struct UpdateEmployee {
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub position: Option<String>,
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    pub department: Option<String>,
    pub hire_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: Id, first: &str, last: &str) -> EmployeeProfile {
        EmployeeProfile {
            id,
            user_id: id,
            first_name: first.into(),
            last_name: last.into(),
            email: format!("{}@test.com", first.to_lowercase()),
            role: Role::Employee,
            position: "Developer".into(),
            department: "IT".into(),
            hire_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            is_active: true,
        }
    }

    #[test]
    fn test_sort_by_last_then_first_name() {
        let mut list = vec![
            profile(1, "Zofia", "Nowak"),
            profile(2, "Adam", "Nowak"),
            profile(3, "Jan", "Kierownik"),
        ];
        EmployeeProfile::sort_by_name(&mut list);
        let ids: Vec<Id> = list.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_new_employee_requires_position() {
        let new = NewEmployee {
            position: String::new(),
            department: "IT".into(),
            hire_date: None,
        };
        assert!(new.validate().is_err());
    }
}
