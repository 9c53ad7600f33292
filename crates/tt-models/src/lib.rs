//! # tt-models
//!
//! Domain models for the time tracker.
//!
//! Each persisted model implements the core traits from `tt-core`
//! (Entity, Identifiable, Timestamped). Input structs derive
//! `validator::Validate` for the shape checks that do not need the database.

pub use tt_core::traits::{Auditable, EmployeeOwned, Entity, Id, Identifiable, Lockable, Timestamped};

pub mod client;
pub mod day_marker;
pub mod employee;
pub mod project;
pub mod role;
pub mod time_entry;
pub mod user;

pub use client::{Client, ClientFilter, ClientForm};
pub use day_marker::{DayMarker, DayMarkerType, DayMarkerUpsert};
pub use employee::{Employee, EmployeeProfile, NewEmployee, UpdateEmployee};
pub use project::{Project, ProjectFilter, ProjectForm, ProjectStatus};
pub use role::Role;
pub use time_entry::{NewTimeEntry, TimeEntry, TimeEntryFilter};
pub use user::{NewUser, UpdateUser, User};

/// Error returned when a stored enum label cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl std::fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}
