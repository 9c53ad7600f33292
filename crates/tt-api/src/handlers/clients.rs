//! Client API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tt_core::traits::Id;
use tt_models::{ClientFilter, ClientForm};
use tt_services::{ClientService, ReportService};

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

/// GET /clients
pub async fn list_clients(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(filter): Query<ClientFilter>,
) -> ApiResult<impl IntoResponse> {
    let clients = ClientService::new(&state.stores, &user).list(filter).await?;
    Ok(Json(clients))
}

/// GET /clients/:id
pub async fn get_client(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let client = ClientService::new(&state.stores, &user).get(id).await?;
    Ok(Json(client))
}

/// POST /clients
pub async fn create_client(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(form): Json<ClientForm>,
) -> ApiResult<impl IntoResponse> {
    let client = ClientService::new(&state.stores, &user).create(form).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

/// PUT /clients/:id
pub async fn update_client(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(form): Json<ClientForm>,
) -> ApiResult<impl IntoResponse> {
    let client = ClientService::new(&state.stores, &user).update(id, form).await?;
    Ok(Json(client))
}

/// DELETE /clients/:id
pub async fn delete_client(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    ClientService::new(&state.stores, &user).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /clients/:id/report
pub async fn client_report(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let report = ReportService::new(&state.stores, &user).client(id).await?;
    Ok(Json(report))
}
