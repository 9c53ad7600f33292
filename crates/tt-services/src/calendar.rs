//! Weekly calendar
//!
//! Assembles the seven-day grid for one employee: entries bucketed per day in
//! start order, at most one day marker per day, and the projects the employee
//! may log against.

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tt_core::dates::{week_days, week_start, weekday_name};
use tt_core::result::TtResult;
use tt_core::traits::Id;
use tt_db::Stores;
use tt_models::{DayMarker, DayMarkerType, DayMarkerUpsert, NewTimeEntry, TimeEntryFilter};

use crate::context::{creator_name, project_names, select_employee, user_names, Caller};
use crate::day_markers::DayMarkerService;
use crate::time_entries::{TimeEntryService, TimeEntryUpdate};
use crate::views::{EmployeeOption, EntryView, ProjectOption};

/// One column of the week grid
#[derive(Debug, Clone, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub weekday: &'static str,
    pub entries: Vec<EntryView>,
    pub marker: Option<DayMarker>,
    pub total_hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekView {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub employee_id: Id,
    pub employee_name: String,
    pub can_select_employee: bool,
    /// Present for staff only
    pub employees: Option<Vec<EmployeeOption>>,
    /// Projects assigned to the shown employee, by name
    pub projects: Vec<ProjectOption>,
    pub days: Vec<CalendarDay>,
}

/// Quick-add from the grid
#[derive(Debug, Clone, Deserialize)]
pub struct AddEntryRequest {
    pub employee_id: Id,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub project_id: Option<Id>,
    pub description: Option<String>,
}

/// In-grid edit; the date of an entry never changes here
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateEntryRequest {
    pub id: Id,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub project_id: Option<Id>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteEntryRequest {
    pub id: Id,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetMarkerRequest {
    pub employee_id: Id,
    pub date: NaiveDate,
    #[serde(alias = "type")]
    pub marker_type: DayMarkerType,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoveMarkerRequest {
    pub employee_id: Id,
    pub date: NaiveDate,
}

pub struct CalendarService<'a> {
    stores: &'a Stores,
    caller: &'a Caller,
    today: NaiveDate,
}

impl<'a> CalendarService<'a> {
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

    fn entries(&self) -> TimeEntryService<'a> {
        TimeEntryService::new(self.stores, self.caller).with_today(self.today)
    }

    /// Returns the id of the new entry
    pub async fn add_entry(&self, request: AddEntryRequest) -> TtResult<Id> {
        let entry = self
            .entries()
            .create(NewTimeEntry {
                employee_id: request.employee_id,
                project_id: request.project_id,
                entry_date: request.date,
                start_time: request.start_time,
                end_time: request.end_time,
                description: request.description,
                created_by: None,
            })
            .await?;
        Ok(entry.id)
    }

    pub async fn update_entry(&self, request: UpdateEntryRequest) -> TtResult<()> {
        self.entries()
            .update(
                request.id,
                TimeEntryUpdate {
                    entry_date: None,
                    start_time: request.start_time,
                    end_time: request.end_time,
                    project_id: request.project_id,
                    description: request.description,
                },
            )
            .await?;
        Ok(())
    }

    pub async fn delete_entry(&self, request: DeleteEntryRequest) -> TtResult<()> {
        self.entries().delete(request.id).await
    }

    pub async fn set_marker(&self, request: SetMarkerRequest) -> TtResult<()> {
        DayMarkerService::new(self.stores, self.caller)
            .set(DayMarkerUpsert {
                employee_id: request.employee_id,
                date: request.date,
                marker_type: request.marker_type,
                note: request.note,
                created_by: None,
            })
            .await?;
        Ok(())
    }

    pub async fn remove_marker(&self, request: RemoveMarkerRequest) -> TtResult<()> {
        DayMarkerService::new(self.stores, self.caller)
            .remove(request.employee_id, request.date)
            .await?;
        Ok(())
    }

    /// The week containing `date` (default today) for the selected employee
    pub async fn week(&self, date: Option<NaiveDate>, employee_id: Option<Id>) -> TtResult<WeekView> {
        let actor = self.caller.actor()?;

        let own = match actor.employee_id() {
            Some(id) => self.stores.employees.find_by_id(id).await?,
            None => None,
        };
        let candidates = if actor.is_staff() {
            self.stores.employees.list(true).await?
        } else {
            Vec::new()
        };
        let employee = select_employee(&actor, own, &candidates, employee_id, true)?;

        let anchor = date.unwrap_or(self.today);
        let first = week_start(anchor);
        let last = first + Duration::days(6);

        let filter = TimeEntryFilter::for_employee(employee.id).between(first, last);
        let entries = self.stores.time_entries.list(&filter).await?;
        let markers = self.stores.day_markers.list(employee.id, first, last).await?;
        let projects = self.stores.employees.assigned_projects(employee.id).await?;

        let names = project_names(self.stores).await?;
        let creators = user_names(self.stores, entries.iter().map(|e| e.created_by)).await?;

        let days = week_days(anchor)
            .into_iter()
            .map(|day| {
                let mut day_entries: Vec<EntryView> = entries
                    .iter()
                    .filter(|e| e.entry_date == day)
                    .map(|e| {
                        EntryView::new(
                            e,
                            e.project_id.and_then(|id| names.get(&id).cloned()),
                            creator_name(&creators, e.created_by),
                        )
                    })
                    .collect();
                day_entries.sort_by_key(|e| e.start_time);

                CalendarDay {
                    date: day,
                    weekday: weekday_name(day),
                    total_hours: day_entries.iter().map(|e| e.hours).sum(),
                    entries: day_entries,
                    marker: markers.iter().find(|m| m.date == day).cloned(),
                }
            })
            .collect();

        Ok(WeekView {
            week_start: first,
            week_end: last,
            employee_id: employee.id,
            employee_name: employee.full_name(),
            can_select_employee: actor.is_staff(),
            employees: actor
                .is_staff()
                .then(|| candidates.iter().map(EmployeeOption::from).collect()),
            projects: projects.iter().map(ProjectOption::from).collect(),
            days,
        })
    }
}


#[cfg(test)]
mod action_tests {
    use super::*;
    use crate::test_support::{fixture, time};

    #[tokio::test]
    async fn test_add_update_delete_roundtrip() {
        let fx = fixture().await;
        let service = CalendarService::new(&fx.stores, &fx.employee).with_today(fx.today);

        let id = service
            .add_entry(AddEntryRequest {
                employee_id: fx.employee_id(),
                date: fx.today,
                start_time: time(9, 0),
                end_time: time(11, 0),
                project_id: Some(fx.portal.id),
                description: Some("Review".into()),
            })
            .await
            .unwrap();

        service
            .update_entry(UpdateEntryRequest {
                id,
                start_time: None,
                end_time: Some(time(12, 0)),
                project_id: None,
                description: None,
            })
            .await
            .unwrap();
        let entry = fx.stores.time_entries.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(entry.end_time, time(12, 0));
        assert!(entry.is_unassigned());

        service.delete_entry(DeleteEntryRequest { id }).await.unwrap();
        assert!(fx.stores.time_entries.find_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_for_unassigned_project_fails() {
        let fx = fixture().await;
        let service = CalendarService::new(&fx.stores, &fx.employee).with_today(fx.today);
        let err = service
            .add_entry(AddEntryRequest {
                employee_id: fx.employee_id(),
                date: fx.today,
                start_time: time(9, 0),
                end_time: time(11, 0),
                project_id: Some(fx.unassigned_project.id),
                description: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Employee is not assigned to this project");
    }

    #[tokio::test]
    async fn test_marker_request_accepts_type_key() {
        let fx = fixture().await;
        let request: SetMarkerRequest = serde_json::from_value(serde_json::json!({
            "employee_id": fx.employee_id(),
            "date": "2025-03-11",
            "type": "vacation",
        }))
        .unwrap();
        let service = CalendarService::new(&fx.stores, &fx.employee).with_today(fx.today);
        service.set_marker(request).await.unwrap();
        service
            .remove_marker(RemoveMarkerRequest {
                employee_id: fx.employee_id(),
                date: crate::test_support::date(2025, 3, 11),
            })
            .await
            .unwrap();
    }
}
