//! Time entry model
//!
//! Table: time_entries

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tt_core::dates::hours_between;
use tt_core::traits::{Auditable, EmployeeOwned, Entity, Id, Identifiable, Timestamped};

/// A bounded interval worked by one employee, optionally tied to a project
///
/// An entry with `project_id == None` is "unassigned" and blocks the
/// monthly export for its employee until a project is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: Id,
    pub employee_id: Id,
    pub project_id: Option<Id>,
    pub entry_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Id>,
}

impl TimeEntry {
    /// `end_time - start_time` in hours
    pub fn total_hours(&self) -> f64 {
        hours_between(self.start_time, self.end_time)
    }

    pub fn is_unassigned(&self) -> bool {
        self.project_id.is_none()
    }

    /// Half-open interval intersection on the same day
    pub fn overlaps(&self, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> bool {
        self.entry_date == date && start < self.end_time && end > self.start_time
    }
}

impl Identifiable for TimeEntry {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for TimeEntry {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Auditable for TimeEntry {
    fn created_by_id(&self) -> Option<Id> {
        self.created_by
    }
}

impl EmployeeOwned for TimeEntry {
    fn owner_employee_id(&self) -> Id {
        self.employee_id
    }
}

impl Entity for TimeEntry {
    const TABLE_NAME: &'static str = "time_entries";
    const TYPE_NAME: &'static str = "Time entry";
}

/// Insert parameters for a time entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewTimeEntry {
    pub employee_id: Id,
    pub project_id: Option<Id>,
    pub entry_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub description: Option<String>,
    #[serde(skip)]
    pub created_by: Option<Id>,
}

impl NewTimeEntry {
    pub fn total_hours(&self) -> f64 {
        hours_between(self.start_time, self.end_time)
    }
}

/// Time entry query filter
///
/// Every field narrows the result; `None` means "any".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeEntryFilter {
    pub employee_id: Option<Id>,
    pub project_id: Option<Id>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Only entries without a project
    #[serde(default)]
    pub unassigned_only: bool,
}

impl TimeEntryFilter {
    pub fn for_employee(employee_id: Id) -> Self {
        Self {
            employee_id: Some(employee_id),
            ..Default::default()
        }
    }

    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn unassigned(mut self) -> Self {
        self.unassigned_only = true;
        self
    }

    pub fn matches(&self, entry: &TimeEntry) -> bool {
        self.employee_id.map_or(true, |id| entry.employee_id == id)
            && self.project_id.map_or(true, |id| entry.project_id == Some(id))
            && self.from.map_or(true, |d| entry.entry_date >= d)
            && self.to.map_or(true, |d| entry.entry_date <= d)
            && (!self.unassigned_only || entry.project_id.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn entry(start: NaiveTime, end: NaiveTime) -> TimeEntry {
        TimeEntry {
            id: 1,
            employee_id: 1,
            project_id: None,
            entry_date: NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(),
            start_time: start,
            end_time: end,
            description: None,
            created_at: Utc::now(),
            created_by: None,
        }
    }

    #[test]
    fn test_total_hours() {
        assert_eq!(entry(t(9, 0), t(17, 0)).total_hours(), 8.0);
        assert_eq!(entry(t(8, 30), t(9, 15)).total_hours(), 0.75);
    }

    #[test]
    fn test_overlaps() {
        let e = entry(t(9, 0), t(12, 0));
        let day = e.entry_date;
        assert!(e.overlaps(day, t(11, 0), t(13, 0)));
        assert!(e.overlaps(day, t(8, 0), t(10, 0)));
        assert!(e.overlaps(day, t(8, 0), t(13, 0)));
        assert!(e.overlaps(day, t(10, 0), t(11, 0)));
        assert!(!e.overlaps(day, t(12, 0), t(13, 0)));
        assert!(!e.overlaps(day, t(7, 0), t(9, 0)));
        assert!(!e.overlaps(day.succ_opt().unwrap(), t(9, 0), t(12, 0)));
    }

    #[test]
    fn test_filter_matches() {
        let mut e = entry(t(9, 0), t(10, 0));
        let day = e.entry_date;
        assert!(TimeEntryFilter::for_employee(1).unassigned().matches(&e));
        assert!(!TimeEntryFilter::for_employee(2).matches(&e));
        assert!(TimeEntryFilter::default().between(day, day).matches(&e));
        e.project_id = Some(3);
        assert!(!TimeEntryFilter::default().unassigned().matches(&e));
    }
}
