//! Login, logout, registration and the current account

use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tt_models::NewUser;
use tt_services::{AccountService, LoginOutcome, LoginRequest};

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser, SessionCookie};

#[derive(Debug, Serialize)]
struct LoginSuccess {
    redirect: String,
}

#[derive(Debug, Serialize)]
struct LoginFailure {
    error: String,
}

fn accounts(state: &AppState) -> AccountService<'_> {
    AccountService::new(&state.stores, state.sessions.as_ref(), &state.config.auth)
}

/// POST /account/login
///
/// A failed login is still a 200 so the form can show the message.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Response> {
    let response = match accounts(&state).login(request).await? {
        LoginOutcome::Success { session, redirect } => (
            [(SET_COOKIE, state.cookie.build_cookie(&session))],
            Json(LoginSuccess { redirect }),
        )
            .into_response(),
        LoginOutcome::Failed { error } => Json(LoginFailure { error }).into_response(),
    };
    Ok(response)
}

/// POST /account/logout
pub async fn logout(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    SessionCookie(session_id): SessionCookie,
) -> impl IntoResponse {
    if let Some(id) = session_id {
        accounts(&state).logout(&id);
    }
    (
        StatusCode::NO_CONTENT,
        [(SET_COOKIE, state.cookie.build_clear_cookie())],
    )
}

/// POST /account/register
pub async fn register(
    State(state): State<AppState>,
    Json(user): Json<NewUser>,
) -> ApiResult<impl IntoResponse> {
    let user = accounts(&state).register(user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /account/me
pub async fn me(user: AuthenticatedUser) -> impl IntoResponse {
    Json(AccountService::me(&user))
}
