//! Core traits implemented by the domain models

use chrono::{DateTime, Utc};

/// Primary key type
pub type Id = i64;

/// Trait for entities that have a primary key
pub trait Identifiable {
    fn id(&self) -> Id;
}

/// Trait for entities with a creation timestamp
pub trait Timestamped {
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

/// Trait for entities that record which user created them
pub trait Auditable {
    fn created_by_id(&self) -> Option<Id>;
}

/// Trait for lockable entities (optimistic locking)
pub trait Lockable {
    fn lock_version(&self) -> i32;
}

/// Trait for records owned by a single employee
pub trait EmployeeOwned {
    fn owner_employee_id(&self) -> Id;
}

/// Base trait for all domain entities
pub trait Entity: Identifiable + Send + Sync {
    /// The database table name
    const TABLE_NAME: &'static str;

    /// Human-readable type name for error messages
    const TYPE_NAME: &'static str;
}
