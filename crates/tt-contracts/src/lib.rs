//! # tt-contracts
//!
//! Contract validation and the authorization policy.
//!
//! Contracts validate input before create/update operations and collect
//! every failure into a `ValidationErrors`. The `Actor` type carries the
//! caller's capabilities and answers every "may this caller act on that
//! resource" question.

pub mod actor;
pub mod base;
pub mod clients;
pub mod employees;
pub mod projects;
pub mod time_entries;

pub use actor::Actor;
pub use base::*;
