//! Day marker service

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::info;
use tt_contracts::collect_shape_errors;
use tt_core::dates::{month_days, month_range};
use tt_core::error::ValidationErrors;
use tt_core::result::TtResult;
use tt_core::traits::Id;
use tt_db::Stores;
use tt_models::{DayMarker, DayMarkerUpsert};

use crate::context::{require_employee, Caller};

pub struct DayMarkerService<'a> {
    stores: &'a Stores,
    caller: &'a Caller,
}

impl<'a> DayMarkerService<'a> {
    pub fn new(stores: &'a Stores, caller: &'a Caller) -> Self {
        Self { stores, caller }
    }

    /// Set the marker of a day, replacing type and note of an existing one
    pub async fn set(&self, mut params: DayMarkerUpsert) -> TtResult<DayMarker> {
        let actor = self.caller.actor()?;
        require_employee(self.stores, params.employee_id).await?;
        actor.authorize_owner(params.employee_id)?;

        let mut errors = ValidationErrors::new();
        collect_shape_errors(&params, &mut errors);
        errors.into_result()?;

        params.created_by = Some(self.caller.user_id);
        let marker = self.stores.day_markers.upsert(&params).await?;

        info!(
            employee_id = marker.employee_id,
            date = %marker.date,
            marker_type = marker.marker_type.as_str(),
            "Day marker set"
        );
        Ok(marker)
    }

    /// Remove the marker of a day; a missing marker is not an error
    pub async fn remove(&self, employee_id: Id, date: NaiveDate) -> TtResult<bool> {
        self.caller.actor()?.authorize_owner(employee_id)?;
        let removed = self.stores.day_markers.remove(employee_id, date).await?;
        if removed {
            info!(employee_id, date = %date, "Day marker removed");
        }
        Ok(removed)
    }

    /// Every day of the month mapped to its marker, if any
    pub async fn month_map(
        &self,
        employee_id: Id,
        year: i32,
        month: u32,
    ) -> TtResult<BTreeMap<NaiveDate, Option<DayMarker>>> {
        self.caller.actor()?.authorize_owner(employee_id)?;
        month_markers(self.stores, employee_id, year, month).await
    }
}

pub(crate) async fn month_markers(
    stores: &Stores,
    employee_id: Id,
    year: i32,
    month: u32,
) -> TtResult<BTreeMap<NaiveDate, Option<DayMarker>>> {
    let (first, last) = month_range(year, month)?;
    let mut map: BTreeMap<NaiveDate, Option<DayMarker>> =
        month_days(year, month)?.into_iter().map(|d| (d, None)).collect();

    for marker in stores.day_markers.list(employee_id, first, last).await? {
        map.insert(marker.date, Some(marker));
    }
    Ok(map)
}
