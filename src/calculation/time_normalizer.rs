//! Display-time normalization.
//!
//! Raw punches carry seconds and early-arrival slack. This module derives the
//! start/end pair shown in the report from the raw start and the worked
//! minutes that were already computed from the raw punches, so the displayed
//! pair always agrees with the credited duration.

use crate::error::ReportResult;
use crate::models::{AttendanceRecord, DayEntry, LUNCH_START_MINUTES, ShiftPolicy};

use super::time_arithmetic::{
    MINUTES_PER_DAY, QUARTER_HOUR_MINUTES, format_minutes_as_time, parse_time_to_minutes,
    round_up_to_quarter_hour,
};

/// Start time assumed when a day has no clock-in punch.
pub const DEFAULT_START_TIME: &str = "08:30";

/// Latest start a rounded arrival can land on; 23:50 would otherwise become 24:00.
const LAST_QUARTER_OF_DAY: u32 = MINUTES_PER_DAY - QUARTER_HOUR_MINUTES;

/// Lunch minutes to add when `[start, end)` touches the lunch window.
pub fn lunch_break_within(start: u32, end: u32, policy: ShiftPolicy) -> u32 {
    if end <= LUNCH_START_MINUTES || start >= policy.lunch_end_minutes() {
        0
    } else {
        policy.lunch_minutes()
    }
}

/// Computes the normalized `(start, end)` display pair for one day.
///
/// # Examples
///
/// ```
/// use attendance_report::calculation::normalize_day_times;
/// use attendance_report::models::ShiftPolicy;
///
/// // 08:10 rounds up to 08:15; 465 minutes plus a 90 minute lunch ends at 17:30
/// let (start, end) = normalize_day_times(Some("08:10:42"), 465, ShiftPolicy::Standard).unwrap();
/// assert_eq!(start, "08:15");
/// assert_eq!(end, "17:30");
/// ```
pub fn normalize_day_times(
    raw_start: Option<&str>,
    worked_minutes: u32,
    policy: ShiftPolicy,
) -> ReportResult<(String, String)> {
    let raw_start = raw_start
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(DEFAULT_START_TIME);
    let raw_minutes = parse_time_to_minutes(raw_start)?;

    let (hour, minute) = round_up_to_quarter_hour(raw_minutes / 60, raw_minutes % 60);
    let mut start = (hour * 60 + minute).min(LAST_QUARTER_OF_DAY);

    // An arrival during lunch counts as arriving when lunch ends.
    if start >= LUNCH_START_MINUTES && start < policy.lunch_end_minutes() {
        start = policy.lunch_end_minutes();
    }

    let provisional_end = start + worked_minutes;
    let end = (provisional_end + lunch_break_within(start, provisional_end, policy))
        .min(policy.end_of_day_minutes());

    Ok((format_minutes_as_time(start), format_minutes_as_time(end)))
}

/// Fills in the display times of every day entry.
///
/// This is a pure transform: the input is left untouched and worked minutes
/// are carried over unchanged.
pub fn format_attendance_times(records: &[AttendanceRecord]) -> ReportResult<Vec<AttendanceRecord>> {
    records
        .iter()
        .map(|record| {
            let policy = record.employee.shift_policy;
            let days = record
                .days
                .iter()
                .map(|day| {
                    let (start, end) =
                        normalize_day_times(day.start_time.as_deref(), day.worked_minutes, policy)?;
                    Ok(DayEntry {
                        display_start: Some(start),
                        display_end: Some(end),
                        ..day.clone()
                    })
                })
                .collect::<ReportResult<Vec<_>>>()?;

            Ok(AttendanceRecord {
                employee: record.employee.clone(),
                days,
            })
        })
        .collect()
}
