//! # tt-core
//!
//! Core types, traits, and utilities shared by every time tracker crate:
//! - Common error types and the `ValidationErrors` collection
//! - Result type aliases
//! - Core traits (Entity, Identifiable, Timestamped)
//! - Calendar arithmetic (week windows, month ranges, durations)
//! - Configuration loaded from the environment

pub mod config;
pub mod dates;
pub mod error;
pub mod result;
pub mod traits;

pub use error::*;
pub use result::*;
pub use traits::*;
