//! Time entry API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tt_core::traits::Id;
use tt_models::NewTimeEntry;
use tt_services::{TimeEntryQuery, TimeEntryService, TimeEntryUpdate};

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

/// GET /time-entries
pub async fn list_time_entries(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<TimeEntryQuery>,
) -> ApiResult<impl IntoResponse> {
    let entries = TimeEntryService::new(&state.stores, &user).list(query).await?;
    Ok(Json(entries))
}

/// GET /time-entries/:id
pub async fn get_time_entry(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let entry = TimeEntryService::new(&state.stores, &user).get(id).await?;
    Ok(Json(entry))
}

/// POST /time-entries
pub async fn create_time_entry(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(params): Json<NewTimeEntry>,
) -> ApiResult<impl IntoResponse> {
    let entry = TimeEntryService::new(&state.stores, &user).create(params).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// PUT /time-entries/:id
pub async fn update_time_entry(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(changes): Json<TimeEntryUpdate>,
) -> ApiResult<impl IntoResponse> {
    let entry = TimeEntryService::new(&state.stores, &user).update(id, changes).await?;
    Ok(Json(entry))
}

/// DELETE /time-entries/:id
pub async fn delete_time_entry(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    TimeEntryService::new(&state.stores, &user).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
