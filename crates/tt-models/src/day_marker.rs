//! Day marker model
//!
//! Table: day_markers, unique on (employee_id, date)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tt_core::traits::{Auditable, EmployeeOwned, Entity, Id, Identifiable, Timestamped};
use validator::Validate;

use crate::UnknownVariant;

/// Whole-day status overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayMarkerType {
    BusinessTrip,
    DayOff,
    Sick,
    Vacation,
}

impl DayMarkerType {
    pub const ALL: [DayMarkerType; 4] = [
        DayMarkerType::BusinessTrip,
        DayMarkerType::DayOff,
        DayMarkerType::Sick,
        DayMarkerType::Vacation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BusinessTrip => "business_trip",
            Self::DayOff => "day_off",
            Self::Sick => "sick",
            Self::Vacation => "vacation",
        }
    }

    /// Human label used in reports and the spreadsheet
    pub fn label(&self) -> &'static str {
        match self {
            Self::BusinessTrip => "Business trip",
            Self::DayOff => "Day off",
            Self::Sick => "Sick leave",
            Self::Vacation => "Vacation",
        }
    }
}

impl FromStr for DayMarkerType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "business_trip" => Ok(Self::BusinessTrip),
            "day_off" => Ok(Self::DayOff),
            "sick" => Ok(Self::Sick),
            "vacation" => Ok(Self::Vacation),
            other => Err(UnknownVariant {
                kind: "day marker type",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayMarker {
    pub id: Id,
    pub employee_id: Id,
    pub date: NaiveDate,
    pub marker_type: DayMarkerType,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Id>,
}

impl Identifiable for DayMarker {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for DayMarker {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Auditable for DayMarker {
    fn created_by_id(&self) -> Option<Id> {
        self.created_by
    }
}

impl EmployeeOwned for DayMarker {
    fn owner_employee_id(&self) -> Id {
        self.employee_id
    }
}

impl Entity for DayMarker {
    const TABLE_NAME: &'static str = "day_markers";
    const TYPE_NAME: &'static str = "Day marker";
}

/// Upsert parameters keyed by (employee_id, date)
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct DayMarkerUpsert {
    pub employee_id: Id,
    pub date: NaiveDate,
    pub marker_type: DayMarkerType,
    #[validate(length(max = 500))]
    pub note: Option<String>,
    #[serde(skip)]
    pub created_by: Option<Id>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_type_labels() {
        for t in DayMarkerType::ALL {
            assert_eq!(t.as_str().parse::<DayMarkerType>().unwrap(), t);
        }
        assert_eq!(DayMarkerType::Sick.label(), "Sick leave");
    }

    #[test]
    fn test_marker_type_json() {
        let t: DayMarkerType = serde_json::from_str("\"business_trip\"").unwrap();
        assert_eq!(t, DayMarkerType::BusinessTrip);
    }
}
