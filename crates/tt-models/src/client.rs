//! Client model
//!
//! Table: clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tt_core::traits::{Entity, Id, Identifiable, Lockable, Timestamped};
use validator::Validate;

/// A customer that owns projects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: Id,
    pub name: String,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    /// Polish tax identification number
    pub nip: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Incremented on every update
    pub lock_version: i32,
}

impl Identifiable for Client {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for Client {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Lockable for Client {
    fn lock_version(&self) -> i32 {
        self.lock_version
    }
}

impl Entity for Client {
    const TABLE_NAME: &'static str = "clients";
    const TYPE_NAME: &'static str = "Client";
}

/// Client create/edit form
///
/// `lock_version` must echo the version that was read when editing.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ClientForm {
    #[validate(length(min = 1, max = 200, message = "can't be blank or longer than 200 characters"))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(email(message = "is not a valid email address"), length(max = 100))]
    pub email: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(length(max = 200))]
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 20))]
    pub postal_code: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    #[validate(length(max = 50))]
    pub nip: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub lock_version: Option<i32>,
}

fn default_true() -> bool {
    true
}

impl ClientForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            email: None,
            phone: None,
            address: None,
            city: None,
            postal_code: None,
            country: None,
            nip: None,
            is_active: true,
            lock_version: None,
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Client list filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientFilter {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_form_validation() {
        assert!(ClientForm::new("ABC Corporation").validate().is_ok());
        assert!(ClientForm::new("").validate().is_err());
        let bad_email = ClientForm::new("ABC").with_email("nope");
        assert!(bad_email
            .validate()
            .unwrap_err()
            .field_errors()
            .contains_key("email"));
    }

    #[test]
    fn test_client_form_defaults_active() {
        let form: ClientForm = serde_json::from_str(r#"{"name":"TechStart"}"#).unwrap();
        assert!(form.is_active);
        assert_eq!(form.lock_version, None);
    }
}
