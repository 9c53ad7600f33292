//! Role model
//!
//! Table column: users.role

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::UnknownVariant;

/// Account role
///
/// Ordered by privilege: `Employee < Manager < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Employee,
    Manager,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }

    /// Manager or Admin: may act on any employee's data
    pub fn is_staff(&self) -> bool {
        matches!(self, Self::Manager | Self::Admin)
    }

    /// Roles a holder of `self` is allowed to hand out when creating accounts
    pub fn can_grant(&self, other: Role) -> bool {
        match self {
            Self::Admin => true,
            Self::Manager => other == Role::Employee,
            Self::Employee => false,
        }
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "employee" => Ok(Self::Employee),
            "manager" => Ok(Self::Manager),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownVariant {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("manager".parse::<Role>().unwrap(), Role::Manager);
        assert!("root".parse::<Role>().is_err());
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn test_grants() {
        assert!(Role::Admin.can_grant(Role::Admin));
        assert!(Role::Manager.can_grant(Role::Employee));
        assert!(!Role::Manager.can_grant(Role::Manager));
        assert!(!Role::Manager.can_grant(Role::Admin));
        assert!(!Role::Employee.can_grant(Role::Employee));
    }

    #[test]
    fn test_staff() {
        assert!(Role::Admin.is_staff());
        assert!(Role::Manager.is_staff());
        assert!(!Role::Employee.is_staff());
    }
}
