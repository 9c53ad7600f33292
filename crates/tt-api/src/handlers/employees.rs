//! Employee API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tt_contracts::employees::{CreateEmployeeParams, UpdateEmployeeParams};
use tt_core::traits::Id;
use tt_services::EmployeeService;

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

/// GET /employees
pub async fn list_employees(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    let employees = EmployeeService::new(&state.stores, &user).list().await?;
    Ok(Json(employees))
}

/// GET /employees/:id
pub async fn get_employee(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let employee = EmployeeService::new(&state.stores, &user).get(id).await?;
    Ok(Json(employee))
}

/// POST /employees
pub async fn create_employee(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(params): Json<CreateEmployeeParams>,
) -> ApiResult<impl IntoResponse> {
    let employee = EmployeeService::new(&state.stores, &user).create(params).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

/// PUT /employees/:id
pub async fn update_employee(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(params): Json<UpdateEmployeeParams>,
) -> ApiResult<impl IntoResponse> {
    let employee = EmployeeService::new(&state.stores, &user).update(id, params).await?;
    Ok(Json(employee))
}

/// POST /employees/:id/deactivate
///
/// Also ends every open session of the deactivated user.
pub async fn deactivate_employee(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let service = EmployeeService::new(&state.stores, &user);
    let employee = service.get(id).await?;
    service.deactivate(id).await?;
    state.sessions.delete_user_sessions(employee.profile.user_id);
    Ok(StatusCode::NO_CONTENT)
}
