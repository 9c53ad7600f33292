//! Project administration
//!
//! Any signed-in user may browse projects; only staff may change them.

use serde::Serialize;
use tracing::info;
use tt_contracts::projects::ProjectContract;
use tt_contracts::Contract;
use tt_core::error::{TtError, ValidationErrors};
use tt_core::result::TtResult;
use tt_core::traits::Id;
use tt_db::Stores;
use tt_models::{Project, ProjectFilter, ProjectForm};

use crate::context::Caller;
use crate::views::EmployeeOption;

#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetails {
    #[serde(flatten)]
    pub project: Project,
    pub client_name: String,
    pub manager_name: String,
    pub employees: Vec<EmployeeOption>,
}

pub struct ProjectService<'a> {
    stores: &'a Stores,
    caller: &'a Caller,
}

impl<'a> ProjectService<'a> {
    pub fn new(stores: &'a Stores, caller: &'a Caller) -> Self {
        Self { stores, caller }
    }

    pub async fn list(&self, filter: ProjectFilter) -> TtResult<Vec<Project>> {
        self.caller.actor()?;
        Ok(self.stores.projects.list(&filter).await?)
    }

    pub async fn get(&self, id: Id) -> TtResult<ProjectDetails> {
        self.caller.actor()?;
        let project = self.find(id).await?;

        let client_name = self
            .stores
            .clients
            .find_by_id(project.client_id)
            .await?
            .map(|c| c.name)
            .unwrap_or_default();
        let manager_name = self
            .stores
            .employees
            .find_by_id(project.manager_id)
            .await?
            .map(|m| m.full_name())
            .unwrap_or_default();

        let mut employees = Vec::new();
        for employee_id in self.stores.projects.assigned_employee_ids(id).await? {
            if let Some(profile) = self.stores.employees.find_by_id(employee_id).await? {
                employees.push(EmployeeOption::from(&profile));
            }
        }
        employees.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(ProjectDetails {
            project,
            client_name,
            manager_name,
            employees,
        })
    }

    pub async fn create(&self, form: ProjectForm) -> TtResult<Project> {
        self.caller.actor()?.require_staff()?;
        self.validate(&form).await?;

        let project = self.stores.projects.create(&form).await?;
        info!(
            project_id = project.id,
            name = %project.name,
            employees = form.employee_ids.len(),
            "Project created"
        );
        Ok(project)
    }

    /// Replace every field and the assignment list
    pub async fn update(&self, id: Id, form: ProjectForm) -> TtResult<Project> {
        self.caller.actor()?.require_staff()?;
        self.find(id).await?;
        self.validate(&form).await?;

        let project = self.stores.projects.update(id, &form).await?;
        info!(project_id = project.id, status = project.status.as_str(), "Project updated");
        Ok(project)
    }

    /// Delete a project; refused while time entries reference it
    pub async fn delete(&self, id: Id) -> TtResult<()> {
        self.caller.actor()?.require_staff()?;
        self.find(id).await?;

        let entries = self.stores.projects.count_entries(id).await?;
        if entries > 0 {
            return Err(TtError::conflict(format!(
                "The project cannot be deleted because it has {} time entries",
                entries
            )));
        }
        self.stores.projects.delete(id).await?;
        info!(project_id = id, "Project deleted");
        Ok(())
    }

    async fn validate(&self, form: &ProjectForm) -> TtResult<()> {
        let manager = self.stores.employees.find_by_id(form.manager_id).await?;
        let client = self.stores.clients.find_by_id(form.client_id).await?;

        let mut errors = match ProjectContract::new(manager.as_ref(), client.as_ref()).validate(form) {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        for employee_id in &form.employee_ids {
            if self.stores.employees.find_by_id(*employee_id).await?.is_none() {
                errors.add("employee_ids", format!("employee {} does not exist", employee_id));
            }
        }
        Ok(errors.into_result()?)
    }

    async fn find(&self, id: Id) -> TtResult<Project> {
        self.stores
            .projects
            .find_by_id(id)
            .await?
            .ok_or_else(|| TtError::not_found("Project", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, fixture, time};
    use tt_models::{NewTimeEntry, ProjectStatus};

    #[tokio::test]
    async fn test_create_and_update_project() {
        let fx = fixture().await;
        let service = ProjectService::new(&fx.stores, &fx.manager);

        let form = ProjectForm::new("System CRM", fx.manager_id(), fx.client.id, date(2025, 2, 1))
            .with_budget(300.0)
            .with_employees(vec![fx.employee_id()]);
        let project = service.create(form.clone()).await.unwrap();

        let details = service.get(project.id).await.unwrap();
        assert_eq!(details.client_name, "ABC Corporation");
        assert_eq!(details.manager_name, "Jan Kierownik");
        assert_eq!(details.employees.len(), 1);

        let updated = service
            .update(
                project.id,
                form.with_status(ProjectStatus::Completed).with_employees(Vec::new()),
            )
            .await
            .unwrap();
        assert_eq!(updated.status, ProjectStatus::Completed);
        assert!(service.get(project.id).await.unwrap().employees.is_empty());
    }

    #[tokio::test]
    async fn test_manager_must_hold_manager_role() {
        let fx = fixture().await;
        let service = ProjectService::new(&fx.stores, &fx.admin);
        let form = ProjectForm::new("Bad", fx.employee_id(), fx.client.id, date(2025, 2, 1));
        let err = service.create(form).await.unwrap_err();
        assert_eq!(err.status_code(), 422);
        match err {
            TtError::Validation(errors) => assert!(errors.has_error("manager_id")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_employee_and_client() {
        let fx = fixture().await;
        let service = ProjectService::new(&fx.stores, &fx.admin);
        let form = ProjectForm::new("Bad", fx.manager_id(), 999, date(2025, 2, 1)).with_employees(vec![998]);
        match service.create(form).await.unwrap_err() {
            TtError::Validation(errors) => {
                assert!(errors.has_error("client_id"));
                assert!(errors.has_error("employee_ids"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_refused_with_entries() {
        let fx = fixture().await;
        let service = ProjectService::new(&fx.stores, &fx.manager);
        fx.stores
            .time_entries
            .create(&NewTimeEntry {
                employee_id: fx.employee_id(),
                project_id: Some(fx.portal.id),
                entry_date: date(2025, 3, 3),
                start_time: time(9, 0),
                end_time: time(10, 0),
                description: None,
                created_by: None,
            })
            .await
            .unwrap();

        assert_eq!(service.delete(fx.portal.id).await.unwrap_err().status_code(), 409);
        service.delete(fx.unassigned_project.id).await.unwrap();
        assert_eq!(service.get(fx.unassigned_project.id).await.unwrap_err().status_code(), 404);
    }

    #[tokio::test]
    async fn test_employee_reads_but_cannot_write() {
        let fx = fixture().await;
        let service = ProjectService::new(&fx.stores, &fx.employee);
        assert_eq!(service.list(ProjectFilter::default()).await.unwrap().len(), 2);
        let form = ProjectForm::new("Mine", fx.manager_id(), fx.client.id, date(2025, 2, 1));
        assert_eq!(service.create(form).await.unwrap_err().status_code(), 403);
    }
}
