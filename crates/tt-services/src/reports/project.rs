use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use tt_core::error::TtError;
use tt_core::result::TtResult;
use tt_core::traits::Id;
use tt_models::{Project, TimeEntry, TimeEntryFilter};

use super::{sort_by_hours_desc, ReportService};

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeContribution {
    pub employee_id: Id,
    pub employee_name: String,
    pub position: String,
    pub total_hours: f64,
    pub entry_count: usize,
    pub first_entry: NaiveDate,
    pub last_entry: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectSummary {
    pub assigned_employees: usize,
    /// Assigned employees who logged at least one entry
    pub active_employees: usize,
    pub total_hours: f64,
    pub hours_budget: Option<f64>,
    pub budget_usage_percent: Option<f64>,
    pub is_over_budget: bool,
    pub total_entries: usize,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Calendar days from the first to the last entry, inclusive; 0 without entries
    pub days_active: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectReport {
    pub project: Project,
    pub client_name: String,
    pub manager_name: String,
    pub summary: ProjectSummary,
    pub employees: Vec<EmployeeContribution>,
}

impl ReportService<'_> {
    /// All-time breakdown of one project by employee
    pub async fn project(&self, project_id: Id) -> TtResult<ProjectReport> {
        self.caller.actor()?.require_staff()?;

        let project = self
            .stores
            .projects
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| TtError::not_found("Project", project_id))?;

        let entries = self
            .stores
            .time_entries
            .list(&TimeEntryFilter {
                project_id: Some(project_id),
                ..Default::default()
            })
            .await?;
        let assigned = self.stores.projects.assigned_employee_ids(project_id).await?;

        let mut by_employee: HashMap<Id, Vec<&TimeEntry>> = HashMap::new();
        for entry in &entries {
            by_employee.entry(entry.employee_id).or_default().push(entry);
        }

        let mut employees = Vec::with_capacity(by_employee.len());
        for (employee_id, items) in by_employee {
            let profile = self.stores.employees.find_by_id(employee_id).await?;
            let (Some(first_entry), Some(last_entry)) = (
                items.iter().map(|e| e.entry_date).min(),
                items.iter().map(|e| e.entry_date).max(),
            ) else {
                continue;
            };
            employees.push(EmployeeContribution {
                employee_id,
                employee_name: profile.as_ref().map(|p| p.full_name()).unwrap_or_default(),
                position: profile.map(|p| p.position).unwrap_or_default(),
                total_hours: items.iter().map(|e| e.total_hours()).sum(),
                entry_count: items.len(),
                first_entry,
                last_entry,
            });
        }
        sort_by_hours_desc(&mut employees, |e| e.total_hours);

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

        let total_hours: f64 = entries.iter().map(TimeEntry::total_hours).sum();
        let summary = ProjectSummary {
            assigned_employees: assigned.len(),
            active_employees: employees
                .iter()
                .filter(|e| assigned.contains(&e.employee_id))
                .count(),
            total_hours,
            hours_budget: project.hours_budget,
            budget_usage_percent: project.budget_usage_percent(total_hours),
            is_over_budget: project.is_over_budget(total_hours),
            total_entries: entries.len(),
            start_date: project.start_date,
            end_date: project.end_date,
            days_active: days_active(&entries),
        };

        Ok(ProjectReport {
            project,
            client_name,
            manager_name,
            summary,
            employees,
        })
    }
}

fn days_active(entries: &[TimeEntry]) -> i64 {
    let first = entries.iter().map(|e| e.entry_date).min();
    let last = entries.iter().map(|e| e.entry_date).max();
    match (first, last) {
        (Some(first), Some(last)) => (last - first).num_days() + 1,
        _ => 0,
    }
}
