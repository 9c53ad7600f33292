//! # tt-services
//!
//! Business logic services for the time tracker.
//!
//! Every service borrows the shared `Stores` and the `Caller` it acts for,
//! reduces the caller to an `Actor`, and runs contracts before writing.
//! Handlers stay thin: they extract input, build a service and map the
//! `TtResult` to a response.

pub mod accounts;
pub mod calendar;
pub mod clients;
pub mod context;
pub mod day_markers;
pub mod employees;
pub mod export;
pub mod projects;
pub mod reports;
pub mod seed;
pub mod time_entries;
pub mod unassigned;
pub mod views;

#[cfg(test)]
mod test_support;

pub use accounts::{AccountInfo, AccountService, LoginOutcome, LoginRequest};
pub use calendar::{
    AddEntryRequest, CalendarDay, CalendarService, DeleteEntryRequest, RemoveMarkerRequest,
    SetMarkerRequest, UpdateEntryRequest, WeekView,
};
pub use clients::{ClientDetails, ClientService};
pub use context::Caller;
pub use day_markers::DayMarkerService;
pub use employees::{EmployeeDetails, EmployeeService};
pub use export::{ExportFile, ExportService};
pub use projects::{ProjectDetails, ProjectService};
pub use reports::ReportService;
pub use seed::seed_database;
pub use time_entries::{TimeEntryQuery, TimeEntryService, TimeEntryUpdate};
pub use unassigned::{AssignProjectRequest, UnassignedService};
pub use views::{EmployeeOption, EntryView, ProjectOption};
