//! Project API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tt_core::traits::Id;
use tt_models::{ProjectFilter, ProjectForm};
use tt_services::{ProjectService, ReportService};

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

/// GET /projects
pub async fn list_projects(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(filter): Query<ProjectFilter>,
) -> ApiResult<impl IntoResponse> {
    let projects = ProjectService::new(&state.stores, &user).list(filter).await?;
    Ok(Json(projects))
}

/// GET /projects/:id
pub async fn get_project(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let project = ProjectService::new(&state.stores, &user).get(id).await?;
    Ok(Json(project))
}

/// POST /projects
pub async fn create_project(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(form): Json<ProjectForm>,
) -> ApiResult<impl IntoResponse> {
    let project = ProjectService::new(&state.stores, &user).create(form).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// PUT /projects/:id
pub async fn update_project(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(form): Json<ProjectForm>,
) -> ApiResult<impl IntoResponse> {
    let project = ProjectService::new(&state.stores, &user).update(id, form).await?;
    Ok(Json(project))
}

/// DELETE /projects/:id
pub async fn delete_project(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    ProjectService::new(&state.stores, &user).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /projects/:id/report
pub async fn project_report(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let report = ReportService::new(&state.stores, &user).project(id).await?;
    Ok(Json(report))
}
