//! Project model
//!
//! Tables: projects, employee_projects

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tt_core::traits::{Entity, Id, Identifiable, Timestamped};
use validator::Validate;

use crate::UnknownVariant;

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Planning,
    Active,
    OnHold,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Active => "active",
            Self::OnHold => "on_hold",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planning" => Ok(Self::Planning),
            "active" => Ok(Self::Active),
            "on_hold" => Ok(Self::OnHold),
            "completed" => Ok(Self::Completed),
            other => Err(UnknownVariant {
                kind: "project status",
                value: other.to_string(),
            }),
        }
    }
}

/// Project entity
///
/// `manager_id` must reference an employee whose user holds the Manager
/// role; that rule is checked by the project contract at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Id,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub hours_budget: Option<f64>,
    pub manager_id: Id,
    pub client_id: Id,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for Project {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for Project {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Project {
    const TABLE_NAME: &'static str = "projects";
    const TYPE_NAME: &'static str = "Project";
}

impl Project {
    /// `hours / budget * 100`; `None` without a positive budget
    pub fn budget_usage_percent(&self, hours: f64) -> Option<f64> {
        match self.hours_budget {
            Some(budget) if budget > 0.0 => Some(hours / budget * 100.0),
            _ => None,
        }
    }

    /// Budget set and exceeded
    pub fn is_over_budget(&self, hours: f64) -> bool {
        matches!(self.hours_budget, Some(budget) if hours > budget)
    }
}

/// Project create/edit form
///
/// On edit, `employee_ids` replaces the full assignment set.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProjectForm {
    #[validate(length(min = 1, max = 200, message = "can't be blank or longer than 200 characters"))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub hours_budget: Option<f64>,
    pub manager_id: Id,
    pub client_id: Id,
    #[serde(default)]
    pub employee_ids: Vec<Id>,
}

fn default_true() -> bool {
    true
}

impl ProjectForm {
    pub fn new(name: impl Into<String>, manager_id: Id, client_id: Id, start_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            description: None,
            status: ProjectStatus::Planning,
            start_date,
            end_date: None,
            is_active: true,
            hours_budget: None,
            manager_id,
            client_id,
            employee_ids: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_budget(mut self, hours: f64) -> Self {
        self.hours_budget = Some(hours);
        self
    }

    pub fn with_employees(mut self, ids: Vec<Id>) -> Self {
        self.employee_ids = ids;
        self
    }
}

/// Project list filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectFilter {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    pub manager_id: Option<Id>,
    pub status: Option<ProjectStatus>,
    pub client_id: Option<Id>,
}
