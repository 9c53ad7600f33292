//! Employee administration
//!
//! Onboarding creates the user account and the employee profile together.
//! Managers may onboard Employee-role accounts only; Admins may grant any
//! role and are the only ones who may change a role later.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};
use tt_auth::hash_password;
use tt_contracts::employees::{
    CreateEmployeeContract, CreateEmployeeParams, UpdateEmployeeContract, UpdateEmployeeParams,
};
use tt_contracts::Contract;
use tt_core::error::TtError;
use tt_core::result::TtResult;
use tt_core::traits::Id;
use tt_db::{CreateEmployeeDto, CreateUserDto, Stores};
use tt_models::{EmployeeProfile, Role, TimeEntryFilter};

use crate::context::{creator_name, project_names, require_employee, user_names, Caller};
use crate::views::{EntryView, ProjectOption};

/// How many recent entries the details screen shows
pub const RECENT_ENTRIES: usize = 10;

const DUPLICATE_EMAIL: &str = "A user with this email already exists";

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeDetails {
    #[serde(flatten)]
    pub profile: EmployeeProfile,
    pub projects: Vec<ProjectOption>,
    pub recent_entries: Vec<EntryView>,
}

pub struct EmployeeService<'a> {
    stores: &'a Stores,
    caller: &'a Caller,
    today: NaiveDate,
}

impl<'a> EmployeeService<'a> {
    pub fn new(stores: &'a Stores, caller: &'a Caller) -> Self {
        Self {
            stores,
            caller,
            today: Utc::now().date_naive(),
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Active employees by last name, then first name
    pub async fn list(&self) -> TtResult<Vec<EmployeeProfile>> {
        self.caller.actor()?.require_staff()?;
        Ok(self.stores.employees.list(true).await?)
    }

    pub async fn get(&self, id: Id) -> TtResult<EmployeeDetails> {
        self.caller.actor()?.require_staff()?;
        let profile = require_employee(self.stores, id).await?;

        let projects = self
            .stores
            .employees
            .assigned_projects(id)
            .await?
            .iter()
            .map(ProjectOption::from)
            .collect();

        let mut entries = self
            .stores
            .time_entries
            .list(&TimeEntryFilter::for_employee(id))
            .await?;
        entries.sort_by(|a, b| (b.entry_date, b.start_time).cmp(&(a.entry_date, a.start_time)));
        entries.truncate(RECENT_ENTRIES);

        let names = project_names(self.stores).await?;
        let creators = user_names(self.stores, entries.iter().map(|e| e.created_by)).await?;
        let recent_entries = entries
            .iter()
            .map(|e| {
                EntryView::new(
                    e,
                    e.project_id.and_then(|p| names.get(&p).cloned()),
                    creator_name(&creators, e.created_by),
                )
            })
            .collect();

        Ok(EmployeeDetails {
            profile,
            projects,
            recent_entries,
        })
    }

    pub async fn create(&self, params: CreateEmployeeParams) -> TtResult<EmployeeProfile> {
        let actor = self.caller.actor()?;
        actor.require_staff()?;
        actor.authorize_grant(params.user.role)?;
        CreateEmployeeContract.validate(&params)?;

        if self.stores.users.find_by_email(&params.user.email).await?.is_some() {
            warn!(email = %params.user.email, "Onboarding refused, email already registered");
            return Err(TtError::conflict(DUPLICATE_EMAIL));
        }

        let password_hash = hash_password(&params.user.password)?;
        let profile = self
            .stores
            .employees
            .create_with_user(
                CreateUserDto {
                    email: params.user.email.trim().to_string(),
                    password_hash,
                    first_name: params.user.first_name.trim().to_string(),
                    last_name: params.user.last_name.trim().to_string(),
                    role: params.user.role,
                },
                CreateEmployeeDto {
                    position: params.employee.position.trim().to_string(),
                    department: params.employee.department.trim().to_string(),
                    hire_date: params.employee.hire_date.unwrap_or(self.today),
                },
            )
            .await?;

        info!(
            employee_id = profile.id,
            user_id = profile.user_id,
            role = profile.role.as_str(),
            created_by = self.caller.user_id,
            "Employee onboarded"
        );
        Ok(profile)
    }

    pub async fn update(&self, id: Id, params: UpdateEmployeeParams) -> TtResult<EmployeeProfile> {
        let actor = self.caller.actor()?;
        actor.require_staff()?;
        let current = require_employee(self.stores, id).await?;

        if let Some(role) = params.user.role {
            if role != current.role && actor.role() != Role::Admin {
                return Err(TtError::forbidden("Only administrators may change roles"));
            }
        }
        UpdateEmployeeContract.validate(&params)?;

        if let Some(email) = &params.user.email {
            if let Some(other) = self.stores.users.find_by_email(email).await? {
                if other.id != current.user_id {
                    return Err(TtError::conflict(DUPLICATE_EMAIL));
                }
            }
        }

        let profile = self
            .stores
            .employees
            .update(id, params.user, params.employee)
            .await?;
        info!(employee_id = id, updated_by = self.caller.user_id, "Employee updated");
        Ok(profile)
    }

    /// Mark the employee and its user inactive
    pub async fn deactivate(&self, id: Id) -> TtResult<()> {
        self.caller.actor()?.require_staff()?;
        require_employee(self.stores, id).await?;
        self.stores.employees.deactivate(id).await?;
        info!(employee_id = id, deactivated_by = self.caller.user_id, "Employee deactivated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, fixture, time};
    use tt_models::{NewEmployee, NewTimeEntry, NewUser, UpdateEmployee, UpdateUser};

    fn params(email: &str, role: Role) -> CreateEmployeeParams {
        CreateEmployeeParams {
            user: NewUser {
                email: email.to_string(),
                first_name: "Anna".into(),
                last_name: "Nowak".into(),
                password: "Secret123!".into(),
                role,
            },
            employee: NewEmployee {
                position: "Tester".into(),
                department: "QA".into(),
                hire_date: None,
            },
        }
    }

    #[tokio::test]
    async fn test_manager_onboards_employee() {
        let fx = fixture().await;
        let service = EmployeeService::new(&fx.stores, &fx.manager).with_today(fx.today);

        let profile = service.create(params("anna@test.com", Role::Employee)).await.unwrap();
        assert_eq!(profile.hire_date, fx.today);
        assert_eq!(profile.role, Role::Employee);

        let user = fx.stores.users.find_by_email("anna@test.com").await.unwrap().unwrap();
        assert!(tt_auth::verify_password("Secret123!", &user.password_hash));

        let listed = service.list().await.unwrap();
        assert_eq!(listed.len(), 3);
    }

    #[tokio::test]
    async fn test_role_grants_and_duplicates() {
        let fx = fixture().await;
        let manager = EmployeeService::new(&fx.stores, &fx.manager);
        let err = manager.create(params("boss@test.com", Role::Admin)).await.unwrap_err();
        assert_eq!(err.status_code(), 403);

        let admin = EmployeeService::new(&fx.stores, &fx.admin);
        assert!(admin.create(params("boss@test.com", Role::Manager)).await.is_ok());

        let dup = admin
            .create(params("EMPLOYEE@test.com", Role::Employee))
            .await
            .unwrap_err();
        assert_eq!(dup.status_code(), 409);

        let employee = EmployeeService::new(&fx.stores, &fx.employee);
        assert_eq!(
            employee
                .create(params("x@test.com", Role::Employee))
                .await
                .unwrap_err()
                .status_code(),
            403
        );
    }

    #[tokio::test]
    async fn test_only_admin_changes_roles() {
        let fx = fixture().await;
        let promote = || UpdateEmployeeParams {
            user: UpdateUser {
                role: Some(Role::Manager),
                ..Default::default()
            },
            employee: UpdateEmployee {
                position: Some("Lead Developer".into()),
                ..Default::default()
            },
        };

        let manager = EmployeeService::new(&fx.stores, &fx.manager);
        assert_eq!(
            manager.update(fx.employee_id(), promote()).await.unwrap_err().status_code(),
            403
        );

        let admin = EmployeeService::new(&fx.stores, &fx.admin);
        let updated = admin.update(fx.employee_id(), promote()).await.unwrap();
        assert_eq!(updated.role, Role::Manager);
        assert_eq!(updated.position, "Lead Developer");
    }

    #[tokio::test]
    async fn test_details_and_deactivate() {
        let fx = fixture().await;
        for day in 1..=12 {
            fx.stores
                .time_entries
                .create(&NewTimeEntry {
                    employee_id: fx.employee_id(),
                    project_id: Some(fx.portal.id),
                    entry_date: date(2025, 3, day),
                    start_time: time(9, 0),
                    end_time: time(10, 0),
                    description: None,
                    created_by: None,
                })
                .await
                .unwrap();
        }

        let service = EmployeeService::new(&fx.stores, &fx.manager);
        let details = service.get(fx.employee_id()).await.unwrap();
        assert_eq!(details.projects.len(), 1);
        assert_eq!(details.recent_entries.len(), RECENT_ENTRIES);
        assert_eq!(details.recent_entries[0].entry_date, date(2025, 3, 12));
        assert_eq!(
            details.recent_entries[0].project_name.as_deref(),
            Some("Portal E-commerce")
        );

        service.deactivate(fx.employee_id()).await.unwrap();
        assert_eq!(service.list().await.unwrap().len(), 1);
        let user = fx.stores.users.find_by_id(fx.employee.user_id).await.unwrap().unwrap();
        assert!(!user.is_active);
        assert_eq!(service.deactivate(999).await.unwrap_err().status_code(), 404);
    }
}
