//! Minute-resolution wall-clock arithmetic.
//!
//! Times of day are carried as minutes since midnight (`u32`). Parsing accepts
//! the `H:MM` and `H:MM:SS` shapes the attendance store produces; seconds are
//! validated and then dropped.

use crate::error::{ReportError, ReportResult};

/// Minutes in a calendar day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Rounding quantum for worked time and display times.
pub const QUARTER_HOUR_MINUTES: u32 = 15;

/// Daily cap on credited work.
pub const MAX_WORKED_MINUTES: u32 = 8 * 60;

/// Splits "H:MM[:SS]" into hours, minutes and seconds.
fn parse_clock(time: &str) -> ReportResult<(u32, u32, u32)> {
    let format_error = || ReportError::Format {
        value: time.to_string(),
    };

    let parts: Vec<&str> = time.trim().split(':').collect();
    if parts.len() != 2 && parts.len() != 3 {
        return Err(format_error());
    }

    let mut fields = [0u32; 3];
    for (slot, part) in fields.iter_mut().zip(&parts) {
        if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format_error());
        }
        *slot = part.parse().map_err(|_| format_error())?;
    }

    let [hours, minutes, seconds] = fields;
    if hours > 23 || minutes > 59 || seconds > 59 {
        return Err(format_error());
    }
    // "8:5" is ambiguous, minutes must be two digits.
    if parts[1].len() != 2 {
        return Err(format_error());
    }

    Ok((hours, minutes, seconds))
}

/// Parses "H:MM" or "H:MM:SS" into minutes since midnight.
///
/// # Examples
///
/// ```
/// use attendance_report::calculation::parse_time_to_minutes;
///
/// assert_eq!(parse_time_to_minutes("08:30").unwrap(), 510);
/// assert_eq!(parse_time_to_minutes("7:05:59").unwrap(), 425);
/// assert!(parse_time_to_minutes("noon").is_err());
/// ```
pub fn parse_time_to_minutes(time: &str) -> ReportResult<u32> {
    let (hours, minutes, _) = parse_clock(time)?;
    Ok(hours * 60 + minutes)
}

/// Length of the intersection of `[a_start, a_end)` and `[b_start, b_end)`.
///
/// Zero when the intervals are disjoint or only touch at one point.
pub fn overlap_minutes(a_start: u32, a_end: u32, b_start: u32, b_end: u32) -> u32 {
    let start = a_start.max(b_start);
    let end = a_end.min(b_end);
    end.saturating_sub(start)
}

/// Clamps to `cap`, then truncates to the previous multiple of 15.
pub fn round_down_to_quarter_hour(minutes: u32, cap: u32) -> u32 {
    let capped = minutes.min(cap);
    capped / QUARTER_HOUR_MINUTES * QUARTER_HOUR_MINUTES
}

/// Rounds a wall-clock instant up to the next quarter-hour boundary.
///
/// Exact boundaries are returned unchanged; 8:10 becomes 8:15 and 8:50 becomes 9:00.
pub fn round_up_to_quarter_hour(hour: u32, minute: u32) -> (u32, u32) {
    let remainder = minute % QUARTER_HOUR_MINUTES;
    if remainder == 0 {
        return (hour, minute);
    }
    let rounded = minute + (QUARTER_HOUR_MINUTES - remainder);
    if rounded >= 60 {
        (hour + 1, rounded - 60)
    } else {
        (hour, rounded)
    }
}

/// Formats minutes since midnight as zero-padded "HH:MM".
pub fn format_minutes_as_time(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Formats a duration as "H:MM", e.g. 450 → "7:30".
pub fn format_duration(minutes: u32) -> String {
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

/// Converts a wall-clock string into a spreadsheet time-of-day value.
///
/// The result is `hours/24 + minutes/1440 + seconds/86400`.
pub fn excel_time_fraction(time: &str) -> ReportResult<f64> {
    let (hours, minutes, seconds) = parse_clock(time)?;
    Ok(f64::from(hours) / 24.0 + f64::from(minutes) / 1440.0 + f64::from(seconds) / 86400.0)
}

/// Converts a number of minutes into a spreadsheet duration value (fraction of a day).
pub fn minutes_to_day_fraction(minutes: u32) -> f64 {
    f64::from(minutes) / f64::from(MINUTES_PER_DAY)
}
