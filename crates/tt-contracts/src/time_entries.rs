//! Time entry contract
//!
//! Interval, duration and date-window rules for every entry write.

use chrono::{Duration, NaiveDate, NaiveTime};
use tt_core::dates::{hours_between, MAX_ENTRY_AGE_DAYS, MAX_ENTRY_HOURS};
use tt_core::error::ValidationErrors;
use tt_core::traits::Id;
use tt_models::{NewTimeEntry, TimeEntry};

use crate::base::{Contract, ValidationResult};

const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Time entry data for validation
pub trait TimeEntryData: Send + Sync {
    fn entry_date(&self) -> NaiveDate;
    fn start_time(&self) -> NaiveTime;
    fn end_time(&self) -> NaiveTime;
    fn description(&self) -> Option<&str>;
}

impl TimeEntryData for NewTimeEntry {
    fn entry_date(&self) -> NaiveDate {
        self.entry_date
    }
    fn start_time(&self) -> NaiveTime {
        self.start_time
    }
    fn end_time(&self) -> NaiveTime {
        self.end_time
    }
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl TimeEntryData for TimeEntry {
    fn entry_date(&self) -> NaiveDate {
        self.entry_date
    }
    fn start_time(&self) -> NaiveTime {
        self.start_time
    }
    fn end_time(&self) -> NaiveTime {
        self.end_time
    }
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Contract for creating and updating time entries
///
/// `today` is injected so the date window is deterministic under test.
pub struct TimeEntryContract {
    today: NaiveDate,
}

impl TimeEntryContract {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Oldest date still accepted
    pub fn earliest_date(&self) -> NaiveDate {
        self.today - Duration::days(MAX_ENTRY_AGE_DAYS)
    }

    pub fn validate_interval(&self, start: NaiveTime, end: NaiveTime, errors: &mut ValidationErrors) {
        if end <= start {
            errors.add("end_time", "must be after start time");
            return;
        }
        if hours_between(start, end) > MAX_ENTRY_HOURS {
            errors.add("end_time", "cannot exceed 24 hours");
        }
    }

    pub fn validate_date(&self, date: NaiveDate, errors: &mut ValidationErrors) {
        if date > self.today {
            errors.add("entry_date", "cannot be in the future");
        } else if date < self.earliest_date() {
            errors.add(
                "entry_date",
                format!("cannot be older than {} days", MAX_ENTRY_AGE_DAYS),
            );
        }
    }

    pub fn validate_description(&self, description: Option<&str>, errors: &mut ValidationErrors) {
        if description.map_or(false, |d| d.chars().count() > MAX_DESCRIPTION_LENGTH) {
            errors.add(
                "description",
                format!("is too long (maximum is {} characters)", MAX_DESCRIPTION_LENGTH),
            );
        }
    }

    /// Reject an interval that intersects another entry of the same employee
    /// on the same day. `exclude_id` skips the entry being updated.
    pub fn validate_no_overlap<T: TimeEntryData>(
        &self,
        candidate: &T,
        same_day: &[TimeEntry],
        exclude_id: Option<Id>,
    ) -> ValidationResult {
        let clash = same_day
            .iter()
            .filter(|e| Some(e.id) != exclude_id)
            .any(|e| e.overlaps(candidate.entry_date(), candidate.start_time(), candidate.end_time()));
        if clash {
            let mut errors = ValidationErrors::new();
            errors.add("start_time", "overlaps another entry on this day");
            Err(errors)
        } else {
            Ok(())
        }
    }
}

impl<T: TimeEntryData> Contract<T> for TimeEntryContract {
    fn validate(&self, entity: &T) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        self.validate_interval(entity.start_time(), entity.end_time(), &mut errors);
        self.validate_date(entity.entry_date(), &mut errors);
        self.validate_description(entity.description(), &mut errors);

        errors.into_result()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn new_entry(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> NewTimeEntry {
        NewTimeEntry {
            employee_id: 1,
            project_id: None,
            entry_date: date,
            start_time: start,
            end_time: end,
            description: None,
            created_by: None,
        }
    }

    fn stored(id: Id, start: NaiveTime, end: NaiveTime) -> TimeEntry {
        TimeEntry {
            id,
            employee_id: 1,
            project_id: None,
            entry_date: today(),
            start_time: start,
            end_time: end,
            description: None,
            created_at: Utc::now(),
            created_by: None,
        }
    }

    #[test]
    fn test_valid_entry() {
        let contract = TimeEntryContract::new(today());
        assert!(contract.validate(&new_entry(today(), t(9, 0), t(17, 0))).is_ok());
    }

    #[test]
    fn test_end_must_follow_start() {
        let contract = TimeEntryContract::new(today());
        let errors = contract
            .validate(&new_entry(today(), t(17, 0), t(9, 0)))
            .unwrap_err();
        assert!(errors.has_error("end_time"));

        let errors = contract
            .validate(&new_entry(today(), t(9, 0), t(9, 0)))
            .unwrap_err();
        assert!(errors.has_error("end_time"));
    }

    #[test]
    fn test_date_window() {
        let contract = TimeEntryContract::new(today());
        let future = today() + Duration::days(1);
        let errors = contract.validate(&new_entry(future, t(9, 0), t(10, 0))).unwrap_err();
        assert_eq!(errors.get("entry_date").unwrap()[0], "cannot be in the future");

        let too_old = today() - Duration::days(91);
        assert!(contract.validate(&new_entry(too_old, t(9, 0), t(10, 0))).is_err());

        let oldest = today() - Duration::days(90);
        assert!(contract.validate(&new_entry(oldest, t(9, 0), t(10, 0))).is_ok());
    }

    #[test]
    fn test_overlap_detection() {
        let contract = TimeEntryContract::new(today());
        let existing = vec![stored(1, t(9, 0), t(12, 0))];

        let inside_start = new_entry(today(), t(11, 0), t(13, 0));
        assert!(contract.validate_no_overlap(&inside_start, &existing, None).is_err());

        let enclosing = new_entry(today(), t(8, 0), t(13, 0));
        assert!(contract.validate_no_overlap(&enclosing, &existing, None).is_err());

        let adjacent = new_entry(today(), t(12, 0), t(13, 0));
        assert!(contract.validate_no_overlap(&adjacent, &existing, None).is_ok());

        let same = stored(1, t(10, 0), t(11, 0));
        assert!(contract.validate_no_overlap(&same, &existing, Some(1)).is_ok());
    }

    #[test]
    fn test_description_length() {
        let contract = TimeEntryContract::new(today());
        let mut entry = new_entry(today(), t(9, 0), t(10, 0));
        entry.description = Some("x".repeat(501));
        assert!(contract.validate(&entry).unwrap_err().has_error("description"));
    }
}
