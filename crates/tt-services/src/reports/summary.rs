use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use tt_core::result::TtResult;
use tt_core::traits::Id;
use tt_models::{ProjectFilter, TimeEntry, TimeEntryFilter};

use super::{sort_by_hours_desc, ReportService};

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeHoursSummary {
    pub employee_id: Id,
    pub employee_name: String,
    pub total_hours: f64,
    pub entry_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectBudgetSummary {
    pub project_id: Id,
    pub project_name: String,
    pub total_hours: f64,
    pub hours_budget: Option<f64>,
    pub budget_usage_percent: Option<f64>,
    pub is_over_budget: bool,
    pub entry_count: usize,
}

/// Organization-wide totals for one month
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationSummary {
    pub year: i32,
    pub month: u32,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub total_hours: f64,
    /// Employees with at least one entry
    pub total_employees: usize,
    /// Projects with hours in the month
    pub total_projects: usize,
    pub employee_hours: Vec<EmployeeHoursSummary>,
    pub project_hours: Vec<ProjectBudgetSummary>,
}

impl ReportService<'_> {
    pub async fn summary(&self, year: Option<i32>, month: Option<u32>) -> TtResult<OrganizationSummary> {
        self.caller.actor()?.require_staff()?;
        let (year, month, from, to) = self.period(year, month)?;

        let entries = self
            .stores
            .time_entries
            .list(&TimeEntryFilter::default().between(from, to))
            .await?;
        let employees: HashMap<Id, String> = self
            .stores
            .employees
            .list(false)
            .await?
            .iter()
            .map(|e| (e.id, e.full_name()))
            .collect();
        let projects = self.stores.projects.list(&ProjectFilter::default()).await?;

        let mut by_employee: HashMap<Id, Vec<&TimeEntry>> = HashMap::new();
        let mut by_project: HashMap<Id, Vec<&TimeEntry>> = HashMap::new();
        for entry in &entries {
            by_employee.entry(entry.employee_id).or_default().push(entry);
            if let Some(project_id) = entry.project_id {
                by_project.entry(project_id).or_default().push(entry);
            }
        }

        let mut employee_hours: Vec<EmployeeHoursSummary> = by_employee
            .into_iter()
            .map(|(employee_id, items)| EmployeeHoursSummary {
                employee_id,
                employee_name: employees.get(&employee_id).cloned().unwrap_or_default(),
                total_hours: items.iter().map(|e| e.total_hours()).sum(),
                entry_count: items.len(),
            })
            .collect();
        sort_by_hours_desc(&mut employee_hours, |e| e.total_hours);

        let mut project_hours: Vec<ProjectBudgetSummary> = projects
            .iter()
            .map(|project| {
                let items = by_project.get(&project.id).map(Vec::as_slice).unwrap_or_default();
                let hours: f64 = items.iter().map(|e| e.total_hours()).sum();
                ProjectBudgetSummary {
                    project_id: project.id,
                    project_name: project.name.clone(),
                    total_hours: hours,
                    hours_budget: project.hours_budget,
                    budget_usage_percent: project.budget_usage_percent(hours),
                    is_over_budget: project.is_over_budget(hours),
                    entry_count: items.len(),
                }
            })
            .collect();
        sort_by_hours_desc(&mut project_hours, |p| p.total_hours);

        Ok(OrganizationSummary {
            year,
            month,
            from,
            to,
            total_hours: entries.iter().map(TimeEntry::total_hours).sum(),
            total_employees: employee_hours.len(),
            total_projects: project_hours.iter().filter(|p| p.total_hours > 0.0).count(),
            employee_hours,
            project_hours,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, fixture, time};
    use tt_models::NewTimeEntry;

    async fn log(fx: &crate::test_support::Fixture, employee_id: Id, project_id: Option<Id>, day: u32, hours: u32) {
        fx.stores
            .time_entries
            .create(&NewTimeEntry {
                employee_id,
                project_id,
                entry_date: date(2025, 3, day),
                start_time: time(8, 0),
                end_time: time(8 + hours, 0),
                description: None,
                created_by: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_summary_budget_usage() {
        let fx = fixture().await;
        log(&fx, fx.employee_id(), Some(fx.portal.id), 3, 3).await;
        log(&fx, fx.employee_id(), Some(fx.portal.id), 4, 4).await;
        log(&fx, fx.manager_id(), None, 4, 2).await;
        // Outside the month
        log(&fx, fx.manager_id(), Some(fx.portal.id), 1, 1).await;
        fx.stores
            .time_entries
            .create(&NewTimeEntry {
                employee_id: fx.manager_id(),
                project_id: Some(fx.portal.id),
                entry_date: date(2025, 2, 28),
                start_time: time(8, 0),
                end_time: time(9, 0),
                description: None,
                created_by: None,
            })
            .await
            .unwrap();

        let summary = ReportService::new(&fx.stores, &fx.manager)
            .with_today(fx.today)
            .summary(None, None)
            .await
            .unwrap();

        assert_eq!(summary.month, 3);
        assert_eq!(summary.total_hours, 10.0);
        assert_eq!(summary.total_employees, 2);
        assert_eq!(summary.total_projects, 1);
        assert_eq!(summary.employee_hours[0].employee_name, "Piotr Pracownik");
        assert_eq!(summary.employee_hours[0].total_hours, 7.0);

        let portal = &summary.project_hours[0];
        assert_eq!(portal.project_id, fx.portal.id);
        assert_eq!(portal.total_hours, 8.0);
        assert!((portal.budget_usage_percent.unwrap() - 8.0).abs() < 1e-9);
        assert!(!portal.is_over_budget);
        // Projects without hours are still listed
        assert_eq!(summary.project_hours.len(), 2);
    }

    #[tokio::test]
    async fn test_summary_is_staff_only() {
        let fx = fixture().await;
        let err = ReportService::new(&fx.stores, &fx.employee)
            .summary(Some(2025), Some(3))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }
}
