//! Authorization policy
//!
//! The caller is reduced to an `Actor` once per request. Every ownership,
//! assignment and role question is answered here so that services never
//! branch on the raw role.

use serde::Serialize;
use tt_core::error::TtError;
use tt_core::traits::{EmployeeOwned, Id};
use tt_models::Role;

/// The authenticated caller's capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Actor {
    /// May act only on its own records and assigned projects
    Employee { employee_id: Id },
    /// Organization-wide access; may onboard employees
    Manager { employee_id: Option<Id> },
    /// Organization-wide access; may grant any role
    Admin { employee_id: Option<Id> },
}

impl Actor {
    /// Build the actor for a user of `role` whose profile is `employee_id`.
    ///
    /// An Employee-role user must have a profile; staff may operate without one.
    pub fn resolve(role: Role, employee_id: Option<Id>) -> Result<Self, TtError> {
        match role {
            Role::Employee => employee_id
                .map(|employee_id| Actor::Employee { employee_id })
                .ok_or_else(|| TtError::NotFound {
                    entity: "Employee",
                    field: "user_id",
                    value: "current user".to_string(),
                }),
            Role::Manager => Ok(Actor::Manager { employee_id }),
            Role::Admin => Ok(Actor::Admin { employee_id }),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Actor::Employee { .. } => Role::Employee,
            Actor::Manager { .. } => Role::Manager,
            Actor::Admin { .. } => Role::Admin,
        }
    }

    /// The caller's own employee profile, if any
    pub fn employee_id(&self) -> Option<Id> {
        match *self {
            Actor::Employee { employee_id } => Some(employee_id),
            Actor::Manager { employee_id } | Actor::Admin { employee_id } => employee_id,
        }
    }

    pub fn is_staff(&self) -> bool {
        !matches!(self, Actor::Employee { .. })
    }

    /// Admin and Manager pass unconditionally; an Employee only for its own records
    pub fn can_act(&self, owner_employee_id: Id) -> bool {
        match *self {
            Actor::Employee { employee_id } => employee_id == owner_employee_id,
            Actor::Manager { .. } | Actor::Admin { .. } => true,
        }
    }

    /// Whether project choices must be limited to the target employee's assignments
    pub fn must_check_assignment(&self) -> bool {
        matches!(self, Actor::Employee { .. })
    }

    pub fn can_grant(&self, role: Role) -> bool {
        self.role().can_grant(role)
    }

    /// `can_act` as a `Result`
    pub fn authorize_owner(&self, owner_employee_id: Id) -> Result<(), TtError> {
        if self.can_act(owner_employee_id) {
            Ok(())
        } else {
            Err(TtError::forbidden(
                "You do not have permission to act on behalf of this employee",
            ))
        }
    }

    /// Ownership check for a loaded record
    pub fn authorize_record<R: EmployeeOwned>(&self, record: &R) -> Result<(), TtError> {
        self.authorize_owner(record.owner_employee_id())
    }

    /// Assignment predicate: `target_assigned` tells whether the record's
    /// owner is currently assigned to the chosen project.
    pub fn authorize_project(&self, target_assigned: bool) -> Result<(), TtError> {
        if self.must_check_assignment() && !target_assigned {
            Err(TtError::forbidden("Employee is not assigned to this project"))
        } else {
            Ok(())
        }
    }

    /// Gate for organization-wide screens
    pub fn require_staff(&self) -> Result<(), TtError> {
        if self.is_staff() {
            Ok(())
        } else {
            Err(TtError::forbidden("Only managers and administrators may do this"))
        }
    }

    pub fn authorize_grant(&self, role: Role) -> Result<(), TtError> {
        if self.can_grant(role) {
            Ok(())
        } else {
            Err(TtError::forbidden(format!(
                "You are not allowed to create accounts with the {} role",
                role
            )))
        }
    }
}
