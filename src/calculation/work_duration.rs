//! Worked-minutes calculation from raw clock punches.
//!
//! This module converts a clock-in/clock-out pair into the number of minutes
//! credited under an employee's shift policy.

use crate::error::ReportResult;
use crate::models::{LUNCH_START_MINUTES, ShiftPolicy, WORKDAY_START_MINUTES};

use super::time_arithmetic::{
    MAX_WORKED_MINUTES, MINUTES_PER_DAY, overlap_minutes, parse_time_to_minutes,
    round_down_to_quarter_hour,
};

/// Treats a missing or blank punch the same way.
fn present(time: Option<&str>) -> Option<&str> {
    time.filter(|t| !t.trim().is_empty())
}

/// Calculates the worked minutes credited for one day.
///
/// The calculation:
/// 1. Returns 0 when either punch is missing
/// 2. Credits arrival no earlier than 08:00
/// 3. Credits departure no later than the policy's end of day (18:30 for a
///    90 minute lunch, 18:00 for a 60 minute lunch)
/// 4. Treats an end before the start as crossing midnight. The bound in
///    step 3 is applied first, so a day that starts after the bound wraps
///    and is credited the full 8 hours
/// 5. Deducts only the part of the lunch window `[12:00, 12:00 + lunch)` that
///    the credited interval overlaps
/// 6. Floors to a multiple of 15 minutes and caps at 8 hours
///
/// Tickets play no part here; they only decide how a day is displayed.
///
/// # Errors
///
/// Returns [`ReportError::Format`](crate::error::ReportError::Format) when a
/// present punch is not `H:MM[:SS]`.
///
/// # Examples
///
/// ```
/// use attendance_report::calculation::calculate_work_duration;
/// use attendance_report::models::ShiftPolicy;
///
/// // 08:00–18:30 with a 90 minute lunch: 630 - 90 = 540, capped to 480
/// let minutes = calculate_work_duration(Some("08:00"), Some("18:30"), ShiftPolicy::Standard).unwrap();
/// assert_eq!(minutes, 480);
///
/// // Afternoon only, the lunch window is never touched
/// let minutes = calculate_work_duration(Some("14:00"), Some("18:00"), ShiftPolicy::Standard).unwrap();
/// assert_eq!(minutes, 240);
/// ```
pub fn calculate_work_duration(
    start_time: Option<&str>,
    end_time: Option<&str>,
    policy: ShiftPolicy,
) -> ReportResult<u32> {
    let (Some(start_time), Some(end_time)) = (present(start_time), present(end_time)) else {
        return Ok(0);
    };

    let actual_start = parse_time_to_minutes(start_time)?;
    let actual_end = parse_time_to_minutes(end_time)?;

    let work_start = actual_start.max(WORKDAY_START_MINUTES);
    let mut work_end = actual_end.min(policy.end_of_day_minutes());

    // Overnight
    if work_end < work_start {
        work_end += MINUTES_PER_DAY;
    }

    let total = work_end - work_start;
    let lunch = overlap_minutes(
        work_start,
        work_end,
        LUNCH_START_MINUTES,
        policy.lunch_end_minutes(),
    );

    Ok(round_down_to_quarter_hour(
        total.saturating_sub(lunch),
        MAX_WORKED_MINUTES,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;
    use proptest::prelude::*;

    fn minutes(start: &str, end: &str, policy: ShiftPolicy) -> u32 {
        calculate_work_duration(Some(start), Some(end), policy).unwrap()
    }

    /// WD-001: missing punches credit nothing
    #[test]
    fn test_missing_punch_returns_zero() {
        assert_eq!(
            calculate_work_duration(None, Some("17:00"), ShiftPolicy::Standard).unwrap(),
            0
        );
        assert_eq!(
            calculate_work_duration(Some("08:00"), None, ShiftPolicy::Standard).unwrap(),
            0
        );
        assert_eq!(
            calculate_work_duration(Some(""), Some("17:00"), ShiftPolicy::ShortLunch).unwrap(),
            0
        );
    }

    /// WD-002: early arrival is floored at 08:00
    #[test]
    fn test_early_arrival_is_not_credited() {
        assert_eq!(
            minutes("07:00", "12:00", ShiftPolicy::Standard),
            minutes("08:00", "12:00", ShiftPolicy::Standard)
        );
        assert_eq!(minutes("07:00", "12:00", ShiftPolicy::Standard), 240);
    }

    /// WD-003: afternoon-only day has no lunch deduction
    #[test]
    fn test_no_lunch_overlap() {
        assert_eq!(minutes("14:00", "18:00", ShiftPolicy::Standard), 240);
        assert_eq!(minutes("08:00", "11:53", ShiftPolicy::Standard), 225);
    }

    /// WD-004: full days hit the 8 hour cap
    #[test]
    fn test_full_day_is_capped() {
        assert_eq!(minutes("08:00", "18:30", ShiftPolicy::Standard), 480);
        assert_eq!(minutes("08:00", "18:00", ShiftPolicy::ShortLunch), 480);
    }

    /// WD-005: partial lunch overlap deducts only the overlap
    #[test]
    fn test_partial_lunch_overlap() {
        // 08:00–12:45 overlaps 45 minutes of lunch: 285 - 45 = 240
        assert_eq!(minutes("08:00", "12:45", ShiftPolicy::Standard), 240);
        // 13:00–17:00 overlaps 30 minutes of a 90 minute lunch: 240 - 30 = 210
        assert_eq!(minutes("13:00", "17:00", ShiftPolicy::Standard), 210);
        // Same interval under a 60 minute lunch ends at 13:00: no overlap
        assert_eq!(minutes("13:00", "17:00", ShiftPolicy::ShortLunch), 240);
    }

    /// WD-006: departure after the policy bound is clipped
    #[test]
    fn test_late_departure_is_clipped() {
        // 10:20–20:00, 60 minute lunch: end clipped to 18:00, 460 - 60 = 400 → 390
        assert_eq!(minutes("10:20", "20:00", ShiftPolicy::ShortLunch), 390);
        // 10:20–17:55, 90 minute lunch: 455 - 90 = 365 → 360
        assert_eq!(minutes("10:20", "17:55", ShiftPolicy::Standard), 360);
    }

    /// WD-007: end before start wraps across midnight
    #[test]
    fn test_overnight_interval() {
        // 22:00 → 02:00: end stays 02:00 (under the cap) and wraps to 26:00
        // but the start is 22:00, so the span is 240 minutes with no lunch.
        assert_eq!(minutes("22:00", "02:00", ShiftPolicy::Standard), 240);
    }

    /// WD-008: seconds are ignored
    #[test]
    fn test_seconds_are_ignored() {
        assert_eq!(
            minutes("08:00:59", "11:53:10", ShiftPolicy::Standard),
            minutes("08:00", "11:53", ShiftPolicy::Standard)
        );
    }

    /// WD-009: arrival after the end-of-day bound wraps to the cap
    #[test]
    fn test_arrival_after_end_of_day_bound_wraps() {
        // 19:00 → 20:00: end clipped to 18:30, wraps to 42:30, 1410 minutes capped
        assert_eq!(minutes("19:00", "20:00", ShiftPolicy::Standard), 480);
        // 19:00 → 20:00: end clipped to 18:00, wraps to 42:00
        assert_eq!(minutes("19:00", "20:00", ShiftPolicy::ShortLunch), 480);
        // Leaving exactly at the bound does not wrap
        assert_eq!(minutes("18:30", "19:00", ShiftPolicy::Standard), 0);
    }

    #[test]
    fn test_malformed_time_is_an_error() {
        let result = calculate_work_duration(Some("8h"), Some("17:00"), ShiftPolicy::Standard);
        assert!(matches!(result, Err(ReportError::Format { .. })));
    }

    fn time_strategy() -> impl Strategy<Value = String> {
        (0u32..24, 0u32..60, 0u32..60).prop_map(|(h, m, s)| format!("{:02}:{:02}:{:02}", h, m, s))
    }

    fn policy_strategy() -> impl Strategy<Value = ShiftPolicy> {
        prop_oneof![Just(ShiftPolicy::Standard), Just(ShiftPolicy::ShortLunch)]
    }

    proptest! {
        #[test]
        fn prop_result_is_capped_quarter_hours(
            start in time_strategy(),
            end in time_strategy(),
            policy in policy_strategy(),
        ) {
            let worked = calculate_work_duration(Some(&start), Some(&end), policy).unwrap();
            prop_assert_eq!(worked % 15, 0);
            prop_assert!(worked <= 480);
        }

        #[test]
        fn prop_arrival_before_eight_is_floored(
            early_minute in 0u32..480,
            end in time_strategy(),
            policy in policy_strategy(),
        ) {
            let early = format!("{:02}:{:02}", early_minute / 60, early_minute % 60);
            let floored = calculate_work_duration(Some(&early), Some(&end), policy).unwrap();
            let at_eight = calculate_work_duration(Some("08:00"), Some(&end), policy).unwrap();
            prop_assert_eq!(floored, at_eight);
        }
    }
}
