use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use tt_core::error::TtError;
use tt_core::result::TtResult;
use tt_core::traits::Id;
use tt_models::{Client, ProjectFilter, ProjectStatus, TimeEntryFilter};

use super::ReportService;

#[derive(Debug, Clone, Serialize)]
pub struct ClientProjectStats {
    pub project_id: Id,
    pub project_name: String,
    pub status: ProjectStatus,
    pub manager_name: String,
    pub team_size: usize,
    pub total_hours: f64,
    pub hours_budget: Option<f64>,
    pub budget_usage_percent: Option<f64>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientSummary {
    pub total_projects: usize,
    pub active_projects: usize,
    pub completed_projects: usize,
    pub total_hours: f64,
    pub total_budget: f64,
    /// Hours logged on the client's projects
    pub total_budget_used: f64,
    /// Mean usage over projects that have a budget; 0 when none do
    pub average_budget_usage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientReport {
    pub client: Client,
    pub summary: ClientSummary,
    pub projects: Vec<ClientProjectStats>,
}

impl ReportService<'_> {
    /// Per-project portfolio of one client
    pub async fn client(&self, client_id: Id) -> TtResult<ClientReport> {
        self.caller.actor()?.require_staff()?;

        let client = self
            .stores
            .clients
            .find_by_id(client_id)
            .await?
            .ok_or_else(|| TtError::not_found("Client", client_id))?;

        let projects = self
            .stores
            .projects
            .list(&ProjectFilter {
                client_id: Some(client_id),
                ..Default::default()
            })
            .await?;

        let mut managers: HashMap<Id, String> = HashMap::new();
        let mut stats = Vec::with_capacity(projects.len());
        for project in &projects {
            let hours: f64 = self
                .stores
                .time_entries
                .list(&TimeEntryFilter {
                    project_id: Some(project.id),
                    ..Default::default()
                })
                .await?
                .iter()
                .map(|e| e.total_hours())
                .sum();

            if !managers.contains_key(&project.manager_id) {
                let name = self
                    .stores
                    .employees
                    .find_by_id(project.manager_id)
                    .await?
                    .map(|m| m.full_name())
                    .unwrap_or_default();
                managers.insert(project.manager_id, name);
            }

            stats.push(ClientProjectStats {
                project_id: project.id,
                project_name: project.name.clone(),
                status: project.status,
                manager_name: managers.get(&project.manager_id).cloned().unwrap_or_default(),
                team_size: self.stores.projects.assigned_employee_ids(project.id).await?.len(),
                total_hours: hours,
                hours_budget: project.hours_budget,
                budget_usage_percent: project.budget_usage_percent(hours),
                start_date: project.start_date,
                end_date: project.end_date,
            });
        }

        let total_hours: f64 = stats.iter().map(|p| p.total_hours).sum();
        let usages: Vec<f64> = stats.iter().filter_map(|p| p.budget_usage_percent).collect();
        let summary = ClientSummary {
            total_projects: stats.len(),
            active_projects: stats.iter().filter(|p| p.status == ProjectStatus::Active).count(),
            completed_projects: stats
                .iter()
                .filter(|p| p.status == ProjectStatus::Completed)
                .count(),
            total_hours,
            total_budget: stats.iter().filter_map(|p| p.hours_budget).sum(),
            total_budget_used: total_hours,
            average_budget_usage: if usages.is_empty() {
                0.0
            } else {
                usages.iter().sum::<f64>() / usages.len() as f64
            },
        };

        Ok(ClientReport {
            client,
            summary,
            projects: stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, fixture, time};
    use tt_models::NewTimeEntry;

    #[tokio::test]
    async fn test_client_report_totals() {
        let fx = fixture().await;
        fx.stores
            .time_entries
            .create(&NewTimeEntry {
                employee_id: fx.employee_id(),
                project_id: Some(fx.portal.id),
                entry_date: date(2025, 3, 3),
                start_time: time(8, 0),
                end_time: time(18, 0),
                description: None,
                created_by: None,
            })
            .await
            .unwrap();

        let report = ReportService::new(&fx.stores, &fx.manager)
            .client(fx.client.id)
            .await
            .unwrap();

        assert_eq!(report.client.name, "ABC Corporation");
        let summary = &report.summary;
        assert_eq!(summary.total_projects, 2);
        assert_eq!(summary.active_projects, 1);
        assert_eq!(summary.completed_projects, 0);
        assert_eq!(summary.total_hours, 10.0);
        assert_eq!(summary.total_budget, 100.0);
        assert_eq!(summary.total_budget_used, 10.0);
        // Only the portal has a budget
        assert!((summary.average_budget_usage - 10.0).abs() < 1e-9);

        let portal = report
            .projects
            .iter()
            .find(|p| p.project_id == fx.portal.id)
            .unwrap();
        assert_eq!(portal.team_size, 1);
        assert_eq!(portal.manager_name, "Jan Kierownik");
    }

    #[tokio::test]
    async fn test_client_report_requires_staff() {
        let fx = fixture().await;
        let err = ReportService::new(&fx.stores, &fx.employee)
            .client(fx.client.id)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }
}
