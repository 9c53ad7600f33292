//! Reports
//!
//! Read-only aggregations over time entries:
//!
//! - `summary` - organization-wide hours for one month (staff only)
//! - `monthly` - one employee's month by day and by project
//! - `project` - per-employee breakdown of a project with budget usage
//! - `client` - per-project breakdown of a client's portfolio

mod client;
mod monthly;
mod project;
mod summary;

pub use client::{ClientProjectStats, ClientReport, ClientSummary};
pub use monthly::{DailyHours, MonthlyReport, ProjectHours};
pub use project::{EmployeeContribution, ProjectReport, ProjectSummary};
pub use summary::{EmployeeHoursSummary, OrganizationSummary, ProjectBudgetSummary};

use chrono::{Datelike, NaiveDate, Utc};
use tt_core::result::TtResult;
use tt_db::Stores;

use crate::context::Caller;

/// Label used for hours without a project
pub const NO_PROJECT_LABEL: &str = "(none)";

pub struct ReportService<'a> {
    stores: &'a Stores,
    caller: &'a Caller,
    today: NaiveDate,
}

impl<'a> ReportService<'a> {
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

    /// Requested year/month, defaulting to the current month
    fn period(&self, year: Option<i32>, month: Option<u32>) -> TtResult<(i32, u32, NaiveDate, NaiveDate)> {
        let year = year.unwrap_or_else(|| self.today.year());
        let month = month.unwrap_or_else(|| self.today.month());
        let (from, to) = tt_core::dates::month_range(year, month)?;
        Ok((year, month, from, to))
    }
}

/// Sort descending by an f64 key
pub(crate) fn sort_by_hours_desc<T>(items: &mut [T], hours: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| hours(b).total_cmp(&hours(a)));
}
