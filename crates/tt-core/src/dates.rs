//! Calendar arithmetic shared by the calendar, reports and export

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};

use crate::error::TtError;

/// Entries may not be dated further back than this many days
pub const MAX_ENTRY_AGE_DAYS: i64 = 90;

/// Longest interval a single entry may cover
pub const MAX_ENTRY_HOURS: f64 = 24.0;

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = (7 + date.weekday().num_days_from_monday() as i64
        - Weekday::Mon.num_days_from_monday() as i64)
        % 7;
    date - Duration::days(offset)
}

/// The seven days `[week_start, week_start + 6]`
pub fn week_days(date: NaiveDate) -> Vec<NaiveDate> {
    let start = week_start(date);
    (0..7).map(|i| start + Duration::days(i)).collect()
}

/// First and last day of a calendar month
pub fn month_range(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), TtError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| TtError::invalid("month", format!("{}-{} is not a valid month", year, month)))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| TtError::invalid("month", "is out of range"))?;
    Ok((first, next - Duration::days(1)))
}

/// Every day of a calendar month in order
pub fn month_days(year: i32, month: u32) -> Result<Vec<NaiveDate>, TtError> {
    let (first, last) = month_range(year, month)?;
    Ok(first.iter_days().take_while(|d| *d <= last).collect())
}

/// Length of `[start, end)` in fractional hours; negative when reversed
pub fn hours_between(start: NaiveTime, end: NaiveTime) -> f64 {
    (end - start).num_seconds() as f64 / 3600.0
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "",
    }
}

/// "March 2025"
pub fn month_label(year: i32, month: u32) -> String {
    format!("{} {}", month_name(month), year)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_week_start_is_monday() {
        // 2025-03-12 is a Wednesday
        assert_eq!(week_start(d(2025, 3, 12)), d(2025, 3, 10));
        assert_eq!(week_start(d(2025, 3, 10)), d(2025, 3, 10));
        assert_eq!(week_start(d(2025, 3, 16)), d(2025, 3, 10));
        assert_eq!(week_start(d(2025, 3, 17)), d(2025, 3, 17));
    }

    #[test]
    fn test_week_days() {
        let days = week_days(d(2025, 1, 1));
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], d(2024, 12, 30));
        assert_eq!(days[6], d(2025, 1, 5));
    }

    #[test]
    fn test_month_range() {
        assert_eq!(month_range(2024, 2).unwrap(), (d(2024, 2, 1), d(2024, 2, 29)));
        assert_eq!(month_range(2025, 12).unwrap(), (d(2025, 12, 1), d(2025, 12, 31)));
        assert!(month_range(2025, 13).is_err());
        assert_eq!(month_days(2025, 4).unwrap().len(), 30);
    }

    #[test]
    fn test_hours_between() {
        let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let end = NaiveTime::from_hms_opt(17, 30, 0).unwrap();
        assert_eq!(hours_between(start, end), 8.5);
        assert!(hours_between(end, start) < 0.0);
    }

    #[test]
    fn test_labels() {
        assert_eq!(month_label(2025, 3), "March 2025");
        assert_eq!(weekday_name(d(2025, 3, 15)), "Saturday");
        assert!(is_weekend(d(2025, 3, 16)));
        assert!(!is_weekend(d(2025, 3, 17)));
    }
}
