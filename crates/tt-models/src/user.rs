//! User model
//!
//! Table: users

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tt_core::traits::{Entity, Id, Identifiable, Timestamped};
use validator::Validate;

use crate::role::Role;

/// User account
///
/// Users are never hard-deleted; deactivation clears `is_active`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Id,

    /// Login email (unique)
    pub email: String,

    /// Argon2 PHC string
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for User {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for User {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for User {
    const TABLE_NAME: &'static str = "users";
    const TYPE_NAME: &'static str = "User";
}

impl User {
    /// "First Last"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// New user creation parameters
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(email(message = "is not a valid email address"), length(max = 255))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub last_name: String,

    #[validate(length(min = 6, max = 128, message = "must be at least 6 characters"))]
    pub password: String,

    #[serde(default)]
    pub role: Role,
}

/// User update parameters
#[derive(Debug, Clone, Deserialize, Default, Validate)]
pub struct UpdateUser {
    #[validate(email(message = "is not a valid email address"), length(max = 255))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub last_name: Option<String>,
    pub role: Option<Role>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            first_name: "Piotr".to_string(),
            last_name: "Pracownik".to_string(),
            password: "Employee123!".to_string(),
            role: Role::Employee,
        }
    }

    #[test]
    fn test_new_user_validation() {
        assert!(new_user("employee@test.com").validate().is_ok());
        let errors = new_user("not-an-email").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: 1,
            email: "admin@test.com".into(),
            password_hash: "$argon2id$secret".into(),
            first_name: "Admin".into(),
            last_name: "System".into(),
            role: Role::Admin,
            is_active: true,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert_eq!(user.full_name(), "Admin System");
    }
}
