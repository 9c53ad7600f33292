//! Weekly calendar handlers
//!
//! The grid posts small JSON commands and expects `{success, message?,
//! entryId?}` back with status 200 whatever happened, so domain failures are
//! folded into the body here instead of going through `ApiError`.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use tt_core::result::TtResult;
use tt_core::traits::Id;
use tt_services::{
    AddEntryRequest, CalendarService, DeleteEntryRequest, RemoveMarkerRequest, SetMarkerRequest,
    UpdateEntryRequest,
};

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

#[derive(Debug, Default, Deserialize)]
pub struct WeekQuery {
    pub date: Option<NaiveDate>,
    pub employee_id: Option<Id>,
}

/// Body of every calendar command response
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<Id>,
}

impl CalendarResult {
    fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            entry_id: None,
        }
    }

    fn from_result<T>(result: TtResult<T>, entry_id: impl FnOnce(T) -> Option<Id>) -> Self {
        match result {
            Ok(value) => Self {
                entry_id: entry_id(value),
                ..Self::ok()
            },
            Err(err) => {
                if err.status_code() >= 500 {
                    error!(error = %err, "Calendar command failed");
                } else {
                    warn!(code = err.error_code(), "Calendar command rejected");
                }
                Self::failed(err.user_message())
            }
        }
    }
}

fn unreadable(rejection: JsonRejection) -> Json<CalendarResult> {
    Json(CalendarResult::failed(rejection.body_text()))
}

/// GET /calendar
pub async fn week(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<WeekQuery>,
) -> ApiResult<impl IntoResponse> {
    let view = CalendarService::new(&state.stores, &user)
        .week(query.date, query.employee_id)
        .await?;
    Ok(Json(view))
}

/// POST /calendar/entries/add
pub async fn add_entry(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<AddEntryRequest>, JsonRejection>,
) -> Json<CalendarResult> {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return unreadable(rejection),
    };
    let result = CalendarService::new(&state.stores, &user).add_entry(request).await;
    Json(CalendarResult::from_result(result, Some))
}

/// POST /calendar/entries/update
pub async fn update_entry(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<UpdateEntryRequest>, JsonRejection>,
) -> Json<CalendarResult> {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return unreadable(rejection),
    };
    let result = CalendarService::new(&state.stores, &user).update_entry(request).await;
    Json(CalendarResult::from_result(result, |_| None))
}

/// POST /calendar/entries/delete
pub async fn delete_entry(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<DeleteEntryRequest>, JsonRejection>,
) -> Json<CalendarResult> {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return unreadable(rejection),
    };
    let result = CalendarService::new(&state.stores, &user).delete_entry(request).await;
    Json(CalendarResult::from_result(result, |_| None))
}

/// POST /calendar/markers/set
pub async fn set_marker(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<SetMarkerRequest>, JsonRejection>,
) -> Json<CalendarResult> {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return unreadable(rejection),
    };
    let result = CalendarService::new(&state.stores, &user).set_marker(request).await;
    Json(CalendarResult::from_result(result, |_| None))
}

/// POST /calendar/markers/remove
pub async fn remove_marker(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<RemoveMarkerRequest>, JsonRejection>,
) -> Json<CalendarResult> {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return unreadable(rejection),
    };
    let result = CalendarService::new(&state.stores, &user).remove_marker(request).await;
    Json(CalendarResult::from_result(result, |_| None))
}
