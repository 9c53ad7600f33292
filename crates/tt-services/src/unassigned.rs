//! Entries without a project and their assignment

use serde::{Deserialize, Serialize};
use tracing::info;
use tt_core::error::TtError;
use tt_core::result::TtResult;
use tt_core::traits::Id;
use tt_db::Stores;
use tt_models::{EmployeeProfile, ProjectFilter, ProjectStatus, TimeEntry, TimeEntryFilter};

use crate::context::{creator_name, require_employee, user_names, Caller};
use crate::time_entries::check_project;
use crate::views::{EmployeeOption, EntryView, ProjectOption};

/// The caller's own unassigned entries with the projects it may pick
#[derive(Debug, Clone, Serialize)]
pub struct MyUnassignedEntries {
    pub entries: Vec<EntryView>,
    pub total_hours: f64,
    pub available_projects: Vec<ProjectOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnassignedEntryRow {
    pub employee_name: String,
    #[serde(flatten)]
    pub entry: EntryView,
}

/// Organization-wide unassigned entries
#[derive(Debug, Clone, Serialize)]
pub struct AllUnassignedEntries {
    pub entries: Vec<UnassignedEntryRow>,
    pub total_hours: f64,
    pub selected_employee_id: Option<Id>,
    pub employees: Vec<EmployeeOption>,
    pub available_projects: Vec<ProjectOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignProjectRequest {
    pub entry_id: Id,
    pub project_id: Id,
}

pub struct UnassignedService<'a> {
    stores: &'a Stores,
    caller: &'a Caller,
}

impl<'a> UnassignedService<'a> {
    pub fn new(stores: &'a Stores, caller: &'a Caller) -> Self {
        Self { stores, caller }
    }

    pub async fn my_entries(&self) -> TtResult<MyUnassignedEntries> {
        let actor = self.caller.actor()?;
        let employee_id = actor
            .employee_id()
            .ok_or_else(|| TtError::not_found("Employee", "current user"))?;

        let mut entries = self
            .stores
            .time_entries
            .list(&TimeEntryFilter::for_employee(employee_id).unassigned())
            .await?;
        sort_newest_first(&mut entries);

        let creators = user_names(self.stores, entries.iter().map(|e| e.created_by)).await?;
        let available_projects = self
            .stores
            .employees
            .assigned_projects(employee_id)
            .await?
            .iter()
            .filter(|p| p.is_active)
            .map(ProjectOption::from)
            .collect();

        Ok(MyUnassignedEntries {
            total_hours: entries.iter().map(TimeEntry::total_hours).sum(),
            entries: entries
                .iter()
                .map(|e| EntryView::new(e, None, creator_name(&creators, e.created_by)))
                .collect(),
            available_projects,
        })
    }

    /// Staff view over every employee, optionally narrowed to one
    pub async fn all_entries(&self, employee_id: Option<Id>) -> TtResult<AllUnassignedEntries> {
        self.caller.actor()?.require_staff()?;

        let filter = TimeEntryFilter {
            employee_id,
            ..Default::default()
        }
        .unassigned();
        let mut entries = self.stores.time_entries.list(&filter).await?;
        sort_newest_first(&mut entries);

        let employees: Vec<EmployeeProfile> = self.stores.employees.list(true).await?;
        let all_profiles = self.stores.employees.list(false).await?;
        let creators = user_names(self.stores, entries.iter().map(|e| e.created_by)).await?;

        let available_projects = self
            .stores
            .projects
            .list(&ProjectFilter::default())
            .await?
            .iter()
            .filter(|p| p.is_active && p.status != ProjectStatus::Completed)
            .map(ProjectOption::from)
            .collect();

        let rows = entries
            .iter()
            .map(|e| UnassignedEntryRow {
                employee_name: all_profiles
                    .iter()
                    .find(|p| p.id == e.employee_id)
                    .map(EmployeeProfile::full_name)
                    .unwrap_or_default(),
                entry: EntryView::new(e, None, creator_name(&creators, e.created_by)),
            })
            .collect();

        Ok(AllUnassignedEntries {
            total_hours: entries.iter().map(TimeEntry::total_hours).sum(),
            entries: rows,
            selected_employee_id: employee_id,
            employees: employees.iter().map(EmployeeOption::from).collect(),
            available_projects,
        })
    }

    /// Give an entry its project.
    ///
    /// The entry's owner or staff may assign; an Employee may only pick a
    /// project it is assigned to. The date window does not apply here.
    pub async fn assign(&self, request: AssignProjectRequest) -> TtResult<TimeEntry> {
        let actor = self.caller.actor()?;
        let entry = self
            .stores
            .time_entries
            .find_by_id(request.entry_id)
            .await?
            .ok_or_else(|| TtError::not_found("Time entry", request.entry_id))?;
        actor.authorize_record(&entry)?;
        require_employee(self.stores, entry.employee_id).await?;
        check_project(self.stores, &actor, entry.employee_id, request.project_id).await?;

        let updated = self
            .stores
            .time_entries
            .set_project(entry.id, Some(request.project_id))
            .await?;
        info!(
            entry_id = updated.id,
            project_id = request.project_id,
            assigned_by = self.caller.user_id,
            "Project assigned to entry"
        );
        Ok(updated)
    }
}

fn sort_newest_first(entries: &mut [TimeEntry]) {
    entries.sort_by(|a, b| {
        b.entry_date
            .cmp(&a.entry_date)
            .then_with(|| a.start_time.cmp(&b.start_time))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, fixture, time, Fixture};
    use tt_models::NewTimeEntry;

    async fn unassigned(fx: &Fixture, employee_id: Id, day: u32, start: u32) -> TimeEntry {
        fx.stores
            .time_entries
            .create(&NewTimeEntry {
                employee_id,
                project_id: None,
                entry_date: date(2025, 3, day),
                start_time: time(start, 0),
                end_time: time(start + 1, 0),
                description: None,
                created_by: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_my_entries_ordering_and_projects() {
        let fx = fixture().await;
        unassigned(&fx, fx.employee_id(), 3, 9).await;
        unassigned(&fx, fx.employee_id(), 5, 14).await;
        unassigned(&fx, fx.employee_id(), 5, 8).await;
        unassigned(&fx, fx.manager_id(), 5, 8).await;

        let mine = UnassignedService::new(&fx.stores, &fx.employee)
            .my_entries()
            .await
            .unwrap();
        let order: Vec<_> = mine.entries.iter().map(|e| (e.entry_date, e.start_time)).collect();
        assert_eq!(
            order,
            vec![
                (date(2025, 3, 5), time(8, 0)),
                (date(2025, 3, 5), time(14, 0)),
                (date(2025, 3, 3), time(9, 0)),
            ]
        );
        assert_eq!(mine.total_hours, 3.0);
        assert_eq!(mine.available_projects.len(), 1);
        assert_eq!(mine.available_projects[0].id, fx.portal.id);
        assert_eq!(mine.entries[0].created_by, "System");
    }

    #[tokio::test]
    async fn test_all_entries_filter() {
        let fx = fixture().await;
        unassigned(&fx, fx.employee_id(), 3, 9).await;
        unassigned(&fx, fx.manager_id(), 4, 9).await;

        let service = UnassignedService::new(&fx.stores, &fx.manager);
        let all = service.all_entries(None).await.unwrap();
        assert_eq!(all.entries.len(), 2);
        assert_eq!(all.entries[0].employee_name, "Jan Kierownik");
        assert_eq!(all.available_projects.len(), 2);

        let one = service.all_entries(Some(fx.employee_id())).await.unwrap();
        assert_eq!(one.entries.len(), 1);
        assert_eq!(one.selected_employee_id, Some(fx.employee_id()));

        let employee = UnassignedService::new(&fx.stores, &fx.employee);
        assert_eq!(employee.all_entries(None).await.unwrap_err().status_code(), 403);
    }

    #[tokio::test]
    async fn test_assign_rules() {
        let fx = fixture().await;
        let entry = unassigned(&fx, fx.employee_id(), 3, 9).await;
        let service = UnassignedService::new(&fx.stores, &fx.employee);

        let err = service
            .assign(AssignProjectRequest {
                entry_id: entry.id,
                project_id: fx.unassigned_project.id,
            })
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Employee is not assigned to this project");

        let err = service
            .assign(AssignProjectRequest {
                entry_id: entry.id,
                project_id: 999,
            })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 422);

        let assigned = service
            .assign(AssignProjectRequest {
                entry_id: entry.id,
                project_id: fx.portal.id,
            })
            .await
            .unwrap();
        assert_eq!(assigned.project_id, Some(fx.portal.id));

        // Staff may pick any project
        let other = unassigned(&fx, fx.employee_id(), 4, 9).await;
        let manager = UnassignedService::new(&fx.stores, &fx.manager);
        assert!(manager
            .assign(AssignProjectRequest {
                entry_id: other.id,
                project_id: fx.unassigned_project.id,
            })
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_assign_other_employees_entry_is_forbidden() {
        let fx = fixture().await;
        let entry = unassigned(&fx, fx.manager_id(), 3, 9).await;
        let err = UnassignedService::new(&fx.stores, &fx.employee)
            .assign(AssignProjectRequest {
                entry_id: entry.id,
                project_id: fx.portal.id,
            })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }
}
