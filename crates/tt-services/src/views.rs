//! Small view models shared by several screens

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use tt_core::traits::Id;
use tt_models::{EmployeeProfile, Project, TimeEntry};

/// An employee in a selection list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeOption {
    pub id: Id,
    pub name: String,
}

impl From<&EmployeeProfile> for EmployeeOption {
    fn from(profile: &EmployeeProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.full_name(),
        }
    }
}

/// A project in a selection list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectOption {
    pub id: Id,
    pub name: String,
}

impl From<&Project> for ProjectOption {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id,
            name: project.name.clone(),
        }
    }
}

/// An entry with its names resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryView {
    pub id: Id,
    pub employee_id: Id,
    pub entry_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub hours: f64,
    pub project_id: Option<Id>,
    pub project_name: Option<String>,
    pub description: Option<String>,
    pub created_by: String,
}

impl EntryView {
    pub fn new(entry: &TimeEntry, project_name: Option<String>, created_by: String) -> Self {
        Self {
            id: entry.id,
            employee_id: entry.employee_id,
            entry_date: entry.entry_date,
            start_time: entry.start_time,
            end_time: entry.end_time,
            hours: entry.total_hours(),
            project_id: entry.project_id,
            project_name,
            description: entry.description.clone(),
            created_by,
        }
    }
}
