//! # tt-db
//!
//! Database layer for the time tracker.
//!
//! This crate provides PostgreSQL access using SQLx:
//!
//! - Connection pool management and embedded migrations
//! - One store trait per table, implemented by a PostgreSQL repository
//! - An in-memory implementation of every store for tests and demos
//!
//! ## Example
//!
//! ```ignore
//! use tt_db::{Database, Stores};
//!
//! let db = Database::connect(&config.database).await?;
//! db.migrate().await?;
//! let stores = Stores::postgres(db.pool().clone());
//! let entry = stores.time_entries.find_by_id(1).await?;
//! ```

pub mod clients;
pub mod day_markers;
pub mod employees;
pub mod memory;
pub mod pool;
pub mod projects;
pub mod repository;
pub mod time_entries;
pub mod users;

use std::sync::Arc;

use sqlx::PgPool;

// Re-exports
pub use clients::{ClientRepository, ClientStore};
pub use day_markers::{DayMarkerRepository, DayMarkerStore};
pub use employees::{CreateEmployeeDto, EmployeeRepository, EmployeeStore};
pub use memory::MemoryStore;
pub use pool::Database;
pub use projects::{ProjectRepository, ProjectStore};
pub use repository::{RepositoryError, RepositoryResult};
pub use time_entries::{TimeEntryRepository, TimeEntryStore};
pub use users::{CreateUserDto, UserRepository, UserStore};

/// Handles to every store, shared by services and handlers
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub employees: Arc<dyn EmployeeStore>,
    pub clients: Arc<dyn ClientStore>,
    pub projects: Arc<dyn ProjectStore>,
    pub time_entries: Arc<dyn TimeEntryStore>,
    pub day_markers: Arc<dyn DayMarkerStore>,
}

impl Stores {
    /// PostgreSQL-backed stores sharing one pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            employees: Arc::new(EmployeeRepository::new(pool.clone())),
            clients: Arc::new(ClientRepository::new(pool.clone())),
            projects: Arc::new(ProjectRepository::new(pool.clone())),
            time_entries: Arc::new(TimeEntryRepository::new(pool.clone())),
            day_markers: Arc::new(DayMarkerRepository::new(pool)),
        }
    }

    /// Stores backed by one shared `MemoryStore`
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            employees: store.clone(),
            clients: store.clone(),
            projects: store.clone(),
            time_entries: store.clone(),
            day_markers: store,
        }
    }
}
