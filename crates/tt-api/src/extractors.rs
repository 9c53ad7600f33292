//! Axum extractors for API handlers

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::COOKIE, request::Parts},
};
use tracing::debug;
use tt_auth::{extract_session_id, CookieConfig, SessionStore};
use tt_core::config::AppConfig;
use tt_core::error::TtError;
use tt_db::Stores;
use tt_services::Caller;

use crate::error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub stores: Stores,
    pub sessions: Arc<dyn SessionStore>,
    pub cookie: Arc<CookieConfig>,
}

impl AppState {
    pub fn new(config: AppConfig, stores: Stores, sessions: Arc<dyn SessionStore>) -> Self {
        let cookie = CookieConfig::from_auth_config(&config.auth);
        Self {
            config: Arc::new(config),
            stores,
            sessions,
            cookie: Arc::new(cookie),
        }
    }
}

/// The session id from the request cookies, if any
pub struct SessionCookie(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for SessionCookie
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let session_id = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|header| extract_session_id(header, &app_state.cookie.name));
        Ok(SessionCookie(session_id))
    }
}

/// Signed-in caller, reloaded from the store on every request
pub struct AuthenticatedUser(pub Caller);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let SessionCookie(session_id) = SessionCookie::from_request_parts(parts, state).await?;

        let session = session_id
            .as_deref()
            .and_then(|id| app_state.sessions.get(id))
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        match Caller::load(&app_state.stores, &session.identity).await {
            Ok(caller) => Ok(AuthenticatedUser(caller)),
            Err(err @ TtError::Unauthorized { .. }) => {
                debug!(user_id = session.identity.user_id, "Dropping session of inactive user");
                app_state.sessions.delete(&session.id);
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl std::ops::Deref for AuthenticatedUser {
    type Target = Caller;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
