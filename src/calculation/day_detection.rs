//! Day detection for report columns.
//!
//! This module provides utilities for classifying calendar days (weekday,
//! Saturday, Sunday), for labelling date columns and for converting dates
//! into spreadsheet serial numbers.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Represents the type of a calendar day in the attendance grid.
///
/// # Example
///
/// ```
/// use attendance_report::calculation::{get_day_type, DayType};
/// use chrono::NaiveDate;
///
/// // 2025-03-01 is a Saturday
/// let saturday = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// assert_eq!(get_day_type(saturday), DayType::Saturday);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    /// Monday through Friday.
    Weekday,
    /// Saturday.
    Saturday,
    /// Sunday.
    Sunday,
}

impl DayType {
    /// Returns true for Saturday and Sunday.
    pub fn is_weekend(self) -> bool {
        !matches!(self, DayType::Weekday)
    }
}

impl std::fmt::Display for DayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayType::Weekday => write!(f, "Weekday"),
            DayType::Saturday => write!(f, "Saturday"),
            DayType::Sunday => write!(f, "Sunday"),
        }
    }
}

/// Determines the day type for a calendar date.
pub fn get_day_type(date: NaiveDate) -> DayType {
    match date.weekday() {
        Weekday::Sat => DayType::Saturday,
        Weekday::Sun => DayType::Sunday,
        _ => DayType::Weekday,
    }
}

/// Returns true when the date falls on a Saturday or Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    get_day_type(date).is_weekend()
}

/// Short bilingual weekday label used in the date header row.
pub fn weekday_label(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "T2/Mon",
        Weekday::Tue => "T3/Tue",
        Weekday::Wed => "T4/Wed",
        Weekday::Thu => "T5/Thu",
        Weekday::Fri => "T6/Fri",
        Weekday::Sat => "T7/Sat",
        Weekday::Sun => "CN/Sun",
    }
}

/// "dd/MM" label used in the date header row.
pub fn date_label(date: NaiveDate) -> String {
    date.format("%d/%m").to_string()
}

/// Spreadsheet serial number of a date in the 1900 date system.
///
/// Serial 1 is 1900-01-01; counting from 1899-12-30 absorbs the phantom
/// 1900-02-29 for every date after February 1900.
///
/// # Example
///
/// ```
/// use attendance_report::calculation::excel_serial_date;
/// use chrono::NaiveDate;
///
/// assert_eq!(excel_serial_date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()), 45658.0);
/// ```
pub fn excel_serial_date(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN);
    (date - epoch).num_days() as f64
}
