//! Reporting period and report request models.
//!
//! This module contains the [`ReportPeriod`] and [`ReportRequest`] types that
//! define the context of one export.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::calculation::is_weekend;
use crate::error::{ReportError, ReportResult};

use super::employee::EmployeeId;
use super::project::Project;

/// An inclusive range of calendar days covered by a report.
///
/// # Example
///
/// ```
/// use attendance_report::models::ReportPeriod;
/// use chrono::NaiveDate;
///
/// let period = ReportPeriod::new(
///     NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
/// ).unwrap();
///
/// assert_eq!(period.day_count(), 31);
/// assert_eq!(period.business_day_count(), 21);
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    /// The first day of the period (inclusive).
    pub start_date: NaiveDate,
    /// The last day of the period (inclusive).
    pub end_date: NaiveDate,
}

impl ReportPeriod {
    /// Creates a period, rejecting an end date before the start date.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> ReportResult<Self> {
        if end_date < start_date {
            return Err(ReportError::InvalidPeriod {
                message: format!("end date {} is before start date {}", end_date, start_date),
            });
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// Checks if a given date falls within this period (inclusive).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Number of calendar days, counting both ends.
    pub fn day_count(&self) -> u32 {
        u32::try_from((self.end_date - self.start_date).num_days() + 1).unwrap_or(0)
    }

    /// Every calendar day of the period in order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates = Vec::with_capacity(self.day_count() as usize);
        let mut current = self.start_date;
        while current <= self.end_date {
            dates.push(current);
            match current.checked_add_days(Days::new(1)) {
                Some(next) => current = next,
                None => break,
            }
        }
        dates
    }

    /// Number of days in the period that are not Saturday or Sunday.
    pub fn business_day_count(&self) -> u32 {
        self.dates().into_iter().filter(|d| !is_weekend(*d)).count() as u32
    }

    /// Query bounds: start of the first day through the last second of the final day.
    pub fn query_bounds(&self) -> (NaiveDateTime, NaiveDateTime) {
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        (
            self.start_date.and_time(NaiveTime::MIN),
            self.end_date.and_time(end_of_day),
        )
    }
}

/// A request to export the attendance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportRequest {
    /// Employees to include, in report order.
    pub employee_ids: Vec<EmployeeId>,
    /// The first day of the period (inclusive).
    pub start_date: NaiveDate,
    /// The last day of the period (inclusive).
    pub end_date: NaiveDate,
    /// Project snapshot with memberships.
    #[serde(default)]
    pub projects: Vec<Project>,
    /// File name to suggest instead of the configured pattern. It is only
    /// a name: the destination picker still decides the directory and never
    /// overwrites an existing file.
    #[serde(default)]
    pub file_name: Option<String>,
}

impl ReportRequest {
    /// The validated period of this request.
    pub fn period(&self) -> ReportResult<ReportPeriod> {
        ReportPeriod::new(self.start_date, self.end_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_single_day_period() {
        let period = ReportPeriod::new(make_date("2025-03-03"), make_date("2025-03-03")).unwrap();
        assert_eq!(period.day_count(), 1);
        assert_eq!(period.dates(), vec![make_date("2025-03-03")]);
    }

    #[test]
    fn test_reversed_period_is_rejected() {
        let result = ReportPeriod::new(make_date("2025-03-10"), make_date("2025-03-01"));
        assert!(matches!(result, Err(ReportError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_business_days_exclude_weekends() {
        // 2025-03-01 is a Saturday, 2025-03-09 a Sunday
        let period = ReportPeriod::new(make_date("2025-03-01"), make_date("2025-03-09")).unwrap();
        assert_eq!(period.day_count(), 9);
        assert_eq!(period.business_day_count(), 5);
    }

    #[test]
    fn test_period_spanning_month_boundary() {
        let period = ReportPeriod::new(make_date("2025-02-26"), make_date("2025-03-02")).unwrap();
        let dates = period.dates();
        assert_eq!(dates.len(), 5);
        assert_eq!(dates[2], make_date("2025-02-28"));
        assert_eq!(dates[3], make_date("2025-03-01"));
    }

    #[test]
    fn test_query_bounds_cover_whole_days() {
        let period = ReportPeriod::new(make_date("2025-03-01"), make_date("2025-03-02")).unwrap();
        let (from, to) = period.query_bounds();
        assert_eq!(from.to_string(), "2025-03-01 00:00:00");
        assert_eq!(to.to_string(), "2025-03-02 23:59:59");
    }

    #[test]
    fn test_request_deserialization() {
        let json = r#"{
            "employee_ids": [1, 2],
            "start_date": "2025-03-01",
            "end_date": "2025-03-31",
            "projects": [{"id": 1, "name": "Alpha", "employee_ids": [1]}]
        }"#;
        let request: ReportRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.employee_ids, vec![1, 2]);
        assert!(request.file_name.is_none());
        assert_eq!(request.period().unwrap().day_count(), 31);
    }

    #[test]
    fn test_request_rejects_destination_path() {
        let json = r#"{
            "employee_ids": [1],
            "start_date": "2025-03-01",
            "end_date": "2025-03-31",
            "destination": "/etc/passwd"
        }"#;
        let result: Result<ReportRequest, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
