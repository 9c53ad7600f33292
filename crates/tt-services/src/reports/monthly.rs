use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;
use tt_core::result::TtResult;
use tt_core::traits::Id;
use tt_models::{TimeEntry, TimeEntryFilter};

use super::{sort_by_hours_desc, ReportService, NO_PROJECT_LABEL};
use crate::context::{creator_name, project_names, select_employee, user_names};
use crate::views::{EmployeeOption, EntryView};

#[derive(Debug, Clone, Serialize)]
pub struct DailyHours {
    pub date: NaiveDate,
    pub total_hours: f64,
    /// Ordered by start time
    pub entries: Vec<EntryView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectHours {
    pub project_id: Option<Id>,
    pub project_name: String,
    pub total_hours: f64,
    pub entry_count: usize,
}

/// One employee's month
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub employee_id: Id,
    pub employee_name: String,
    pub can_select_employee: bool,
    pub employees: Option<Vec<EmployeeOption>>,
    pub total_hours: f64,
    /// Days with at least one entry
    pub total_days: usize,
    pub daily_hours: Vec<DailyHours>,
    pub project_hours: Vec<ProjectHours>,
}

impl ReportService<'_> {
    /// Monthly report for `employee_id`.
    ///
    /// Employees always get their own month. Staff get the requested
    /// employee, otherwise the first one alphabetically.
    pub async fn monthly(
        &self,
        employee_id: Option<Id>,
        year: Option<i32>,
        month: Option<u32>,
    ) -> TtResult<MonthlyReport> {
        let actor = self.caller.actor()?;
        let (year, month, from, to) = self.period(year, month)?;

        let own = match actor.employee_id() {
            Some(id) => self.stores.employees.find_by_id(id).await?,
            None => None,
        };
        let candidates = if actor.is_staff() {
            self.stores.employees.list(true).await?
        } else {
            Vec::new()
        };
        let employee = select_employee(&actor, own, &candidates, employee_id, false)?;

        let entries = self
            .stores
            .time_entries
            .list(&TimeEntryFilter::for_employee(employee.id).between(from, to))
            .await?;
        let projects = project_names(self.stores).await?;
        let creators = user_names(self.stores, entries.iter().map(|e| e.created_by)).await?;

        let mut by_day: BTreeMap<NaiveDate, Vec<&TimeEntry>> = BTreeMap::new();
        let mut by_project: HashMap<Option<Id>, Vec<&TimeEntry>> = HashMap::new();
        for entry in &entries {
            by_day.entry(entry.entry_date).or_default().push(entry);
            by_project.entry(entry.project_id).or_default().push(entry);
        }

        let daily_hours: Vec<DailyHours> = by_day
            .into_iter()
            .map(|(date, mut items)| {
                items.sort_by_key(|e| e.start_time);
                DailyHours {
                    date,
                    total_hours: items.iter().map(|e| e.total_hours()).sum(),
                    entries: items
                        .into_iter()
                        .map(|e| {
                            let project_name = e.project_id.and_then(|id| projects.get(&id).cloned());
                            EntryView::new(e, project_name, creator_name(&creators, e.created_by))
                        })
                        .collect(),
                }
            })
            .collect();

        let mut project_hours: Vec<ProjectHours> = by_project
            .into_iter()
            .map(|(project_id, items)| ProjectHours {
                project_id,
                project_name: project_id
                    .and_then(|id| projects.get(&id).cloned())
                    .unwrap_or_else(|| NO_PROJECT_LABEL.to_string()),
                total_hours: items.iter().map(|e| e.total_hours()).sum(),
                entry_count: items.len(),
            })
            .collect();
        sort_by_hours_desc(&mut project_hours, |p| p.total_hours);

        Ok(MonthlyReport {
            year,
            month,
            from,
            to,
            employee_id: employee.id,
            employee_name: employee.full_name(),
            can_select_employee: actor.is_staff(),
            employees: actor
                .is_staff()
                .then(|| candidates.iter().map(EmployeeOption::from).collect()),
            total_hours: entries.iter().map(TimeEntry::total_hours).sum(),
            total_days: daily_hours.len(),
            daily_hours,
            project_hours,
        })
    }
}
