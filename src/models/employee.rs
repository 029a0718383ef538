//! Employee model and shift policy.
//!
//! This module defines the [`Employee`] struct and the [`ShiftPolicy`] enum
//! that selects an employee's lunch-break length and end-of-day bound.

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, ReportResult};

/// Identifier of an employee in the attendance store.
pub type EmployeeId = u64;

/// Minutes since midnight at which the lunch window opens for every policy.
pub const LUNCH_START_MINUTES: u32 = 12 * 60;

/// Minutes since midnight before which arrival is not credited.
pub const WORKDAY_START_MINUTES: u32 = 8 * 60;

/// The shift policy assigned to an employee.
///
/// Serialized as the integer code stored against the employee: `0` selects a
/// 90 minute lunch (12:00–13:30), `30` a 60 minute lunch (12:00–13:00).
///
/// # Example
///
/// ```
/// use attendance_report::models::ShiftPolicy;
///
/// let policy = ShiftPolicy::try_from(30).unwrap();
/// assert_eq!(policy, ShiftPolicy::ShortLunch);
/// assert_eq!(policy.lunch_minutes(), 60);
/// assert_eq!(policy.end_of_day_minutes(), 18 * 60);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum ShiftPolicy {
    /// Code 0: 90 minute lunch, credited until 18:30.
    #[default]
    Standard,
    /// Code 30: 60 minute lunch, credited until 18:00.
    ShortLunch,
}

impl ShiftPolicy {
    /// The integer code persisted for this policy.
    pub fn code(self) -> i32 {
        match self {
            ShiftPolicy::Standard => 0,
            ShiftPolicy::ShortLunch => 30,
        }
    }

    /// Length of the lunch break, `90 - code`.
    pub fn lunch_minutes(self) -> u32 {
        match self {
            ShiftPolicy::Standard => 90,
            ShiftPolicy::ShortLunch => 60,
        }
    }

    /// Minutes since midnight at which the lunch window closes.
    pub fn lunch_end_minutes(self) -> u32 {
        LUNCH_START_MINUTES + self.lunch_minutes()
    }

    /// Latest creditable end of day: 18:00 plus whatever the lunch exceeds an hour by.
    pub fn end_of_day_minutes(self) -> u32 {
        18 * 60 + self.lunch_minutes() - 60
    }
}

impl TryFrom<i32> for ShiftPolicy {
    type Error = ReportError;

    fn try_from(code: i32) -> ReportResult<Self> {
        match code {
            0 => Ok(ShiftPolicy::Standard),
            30 => Ok(ShiftPolicy::ShortLunch),
            other => Err(ReportError::InvalidShiftPolicy { code: other }),
        }
    }
}

impl From<ShiftPolicy> for i32 {
    fn from(policy: ShiftPolicy) -> Self {
        policy.code()
    }
}

/// An employee as listed in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: EmployeeId,
    /// Display name.
    pub name: String,
    /// Login name, shown under the display name in the report.
    #[serde(default)]
    pub username: String,
    /// Lunch-break policy; an absent code means the standard policy.
    #[serde(default)]
    pub shift_policy: ShiftPolicy,
}
