//! Session Authentication
//!
//! A session is created at login and identified by a random id carried in a
//! cookie. Regular sessions slide: every authenticated request pushes the
//! expiry forward by the configured lifetime.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tt_core::traits::Id;
use tt_models::Role;

/// Who the session belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub user_id: Id,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

/// Session data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session ID
    pub id: String,
    pub identity: SessionIdentity,
    /// "Remember me" sessions get a persistent cookie
    pub persistent: bool,
    /// Sliding window length
    pub lifetime_seconds: i64,
    pub created_at: DateTime<Utc>,
    pub accessed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Create an authenticated session
    pub fn authenticated(identity: SessionIdentity, lifetime_seconds: i64, persistent: bool) -> Self {
        let now = Utc::now();
        Self {
            id: generate_session_id(),
            identity,
            persistent,
            lifetime_seconds,
            created_at: now,
            accessed_at: now,
            expires_at: now + Duration::seconds(lifetime_seconds),
        }
    }

    /// Check if the session is valid
    pub fn is_valid(&self) -> bool {
        Utc::now() < self.expires_at
    }

    /// Record activity and slide the expiry forward
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.accessed_at = now;
        self.expires_at = now + Duration::seconds(self.lifetime_seconds);
    }
}

/// Generate a secure random session ID
fn generate_session_id() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    const SESSION_ID_LENGTH: usize = 64;

    let mut rng = rand::rng();
    (0..SESSION_ID_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Session store trait for different backends
pub trait SessionStore: Send + Sync {
    /// Get a live session by ID, sliding its expiry
    fn get(&self, session_id: &str) -> Option<Session>;

    /// Store a session
    fn set(&self, session: Session);

    /// Delete a session
    fn delete(&self, session_id: &str);

    /// Delete all sessions for a user, returning how many were removed
    fn delete_user_sessions(&self, user_id: Id) -> usize;

    /// Clean up expired sessions
    fn cleanup_expired(&self) -> usize;
}

/// In-memory session store
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, session_id: &str) -> Option<Session> {
        let mut sessions = self.sessions.write();
        let session = sessions.get_mut(session_id)?;
        if !session.is_valid() {
            sessions.remove(session_id);
            return None;
        }
        session.touch();
        Some(session.clone())
    }

    fn set(&self, session: Session) {
        self.sessions.write().insert(session.id.clone(), session);
    }

    fn delete(&self, session_id: &str) {
        self.sessions.write().remove(session_id);
    }

    fn delete_user_sessions(&self, user_id: Id) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| s.identity.user_id != user_id);
        before - sessions.len()
    }

    fn cleanup_expired(&self) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        let now = Utc::now();
        sessions.retain(|_, s| s.expires_at > now);
        before - sessions.len()
    }
}

/// Cookie configuration for sessions
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
}

#[derive(Debug, Clone, Copy)]
pub enum SameSite {
    Strict,
    Lax,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "tt_session".to_string(),
            path: "/".to_string(),
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
        }
    }
}

impl CookieConfig {
    pub fn from_auth_config(config: &tt_core::config::AuthConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            secure: config.cookie_secure,
            ..Default::default()
        }
    }

    /// Build the `Set-Cookie` value for a session.
    ///
    /// Persistent sessions get `Max-Age`; others are browser-session cookies.
    pub fn build_cookie(&self, session: &Session) -> String {
        let mut parts = vec![
            format!("{}={}", self.name, session.id),
            format!("Path={}", self.path),
        ];

        if self.secure {
            parts.push("Secure".to_string());
        }

        if self.http_only {
            parts.push("HttpOnly".to_string());
        }

        match self.same_site {
            SameSite::Strict => parts.push("SameSite=Strict".to_string()),
            SameSite::Lax => parts.push("SameSite=Lax".to_string()),
        }

        if session.persistent {
            parts.push(format!("Max-Age={}", session.lifetime_seconds));
        }

        parts.join("; ")
    }

    /// Build cookie header to clear the session
    pub fn build_clear_cookie(&self) -> String {
        format!("{}=; Path={}; Max-Age=0; HttpOnly", self.name, self.path)
    }
}

/// Extract session ID from cookie header
pub fn extract_session_id(cookie_header: &str, cookie_name: &str) -> Option<String> {
    cookie_header
        .split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(name, _)| name.trim() == cookie_name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> SessionIdentity {
        SessionIdentity {
            user_id: 1,
            email: "admin@test.com".to_string(),
            display_name: "Admin System".to_string(),
            role: Role::Admin,
        }
    }

    #[test]
    fn test_session_creation() {
        let session = Session::authenticated(identity(), 3600, false);
        assert!(session.is_valid());
        assert_eq!(session.id.len(), 64);
        assert_eq!(session.identity.user_id, 1);
    }

    #[test]
    fn test_expired_session_is_dropped() {
        let store = MemorySessionStore::new();
        let mut session = Session::authenticated(identity(), 3600, false);
        session.expires_at = Utc::now() - Duration::seconds(1);
        let id = session.id.clone();
        store.set(session);

        assert!(store.get(&id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_get_slides_expiry() {
        let store = MemorySessionStore::new();
        let mut session = Session::authenticated(identity(), 3600, false);
        session.expires_at = Utc::now() + Duration::seconds(5);
        let id = session.id.clone();
        store.set(session);

        let refreshed = store.get(&id).unwrap();
        assert!(refreshed.expires_at > Utc::now() + Duration::seconds(3000));
    }

    #[test]
    fn test_memory_session_store() {
        let store = MemorySessionStore::new();
        let session = Session::authenticated(identity(), 3600, false);
        let session_id = session.id.clone();

        store.set(session);
        assert_eq!(store.get(&session_id).unwrap().identity.role, Role::Admin);

        store.delete(&session_id);
        assert!(store.get(&session_id).is_none());
    }

    #[test]
    fn test_delete_user_sessions() {
        let store = MemorySessionStore::new();
        store.set(Session::authenticated(identity(), 3600, false));
        store.set(Session::authenticated(identity(), 3600, true));
        assert_eq!(store.delete_user_sessions(1), 2);
        assert_eq!(store.delete_user_sessions(1), 0);
    }

    #[test]
    fn test_cookie_config() {
        let config = CookieConfig::default();
        let session = Session::authenticated(identity(), 3600, false);
        let cookie = config.build_cookie(&session);

        assert!(cookie.starts_with(&format!("tt_session={}", session.id)));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(!cookie.contains("Max-Age"));

        let persistent = Session::authenticated(identity(), 86400, true);
        assert!(config.build_cookie(&persistent).contains("Max-Age=86400"));
        assert!(config.build_clear_cookie().contains("Max-Age=0"));
    }

    #[test]
    fn test_extract_session_id() {
        let cookie = "tt_session=abc123; other=value";
        assert_eq!(extract_session_id(cookie, "tt_session"), Some("abc123".to_string()));
        assert_eq!(extract_session_id(cookie, "missing"), None);
        assert_eq!(extract_session_id("tt_session=", "tt_session"), None);
    }
}
