//! Report handlers, the monthly export and the unassigned entries screens

use axum::{
    extract::{Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::IntoResponse,
    Json,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use tt_core::traits::Id;
use tt_services::{AssignProjectRequest, ExportService, ReportService, UnassignedService};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser};

#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub employee_id: Option<Id>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EmployeeQuery {
    pub employee_id: Option<Id>,
}

/// GET /reports/summary
pub async fn summary(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<impl IntoResponse> {
    let report = ReportService::new(&state.stores, &user)
        .summary(query.year, query.month)
        .await?;
    Ok(Json(report))
}

/// GET /reports/monthly
pub async fn monthly(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<impl IntoResponse> {
    let report = ReportService::new(&state.stores, &user)
        .monthly(query.employee_id, query.year, query.month)
        .await?;
    Ok(Json(report))
}

/// GET /reports/monthly/export
///
/// Without `employee_id` the caller's own profile is exported.
pub async fn monthly_export(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<impl IntoResponse> {
    let employee_id = query
        .employee_id
        .or(user.employee_id)
        .ok_or_else(|| ApiError::bad_request("employee_id is required"))?;
    let today = Utc::now().date_naive();

    let file = ExportService::new(&state.stores, &user)
        .monthly_workbook(
            employee_id,
            query.year.unwrap_or(today.year()),
            query.month.unwrap_or(today.month()),
        )
        .await?;

    Ok((
        [
            (CONTENT_TYPE, file.content_type.to_string()),
            (CONTENT_DISPOSITION, content_disposition(&file.file_name)),
        ],
        file.bytes,
    ))
}

/// GET /reports/unassigned
pub async fn my_unassigned(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    let entries = UnassignedService::new(&state.stores, &user).my_entries().await?;
    Ok(Json(entries))
}

/// GET /reports/unassigned/all
pub async fn all_unassigned(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<EmployeeQuery>,
) -> ApiResult<impl IntoResponse> {
    let entries = UnassignedService::new(&state.stores, &user)
        .all_entries(query.employee_id)
        .await?;
    Ok(Json(entries))
}

/// POST /reports/unassigned/assign
pub async fn assign_project(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<AssignProjectRequest>,
) -> ApiResult<impl IntoResponse> {
    let entry = UnassignedService::new(&state.stores, &user).assign(request).await?;
    Ok(Json(entry))
}

/// `attachment` header with an ASCII fallback and an RFC 5987 UTF-8 name
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' { c } else { '_' })
        .collect();

    let mut encoded = String::with_capacity(file_name.len() * 3);
    for byte in file_name.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }

    format!("attachment; filename=\"{}\"; filename*=UTF-8''{}", fallback, encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_encodes_non_ascii() {
        assert_eq!(
            content_disposition("Łukasz-Kowal-March 2025.xlsx"),
            "attachment; filename=\"_ukasz-Kowal-March 2025.xlsx\"; \
             filename*=UTF-8''%C5%81ukasz-Kowal-March%202025.xlsx"
        );
    }
}
