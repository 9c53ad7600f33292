//! API request handlers

pub mod account;
pub mod calendar;
pub mod clients;
pub mod employees;
pub mod projects;
pub mod reports;
pub mod time_entries;
