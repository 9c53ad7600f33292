//! # tt-auth
//!
//! Authentication building blocks for the time tracker.
//!
//! ## Features
//!
//! - Argon2 password hashing and verification
//! - Cookie sessions carrying the caller's identity and role
//! - Post-login redirect selection with open-redirect protection

pub mod error;
pub mod password;
pub mod redirect;
pub mod session;

pub use error::AuthError;
pub use password::{hash_password, verify_password};
pub use redirect::{landing_path, post_login_redirect, safe_return_url};
pub use session::{
    extract_session_id, CookieConfig, MemorySessionStore, SameSite, Session, SessionIdentity,
    SessionStore,
};
