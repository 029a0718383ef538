//! Attendance rows, tickets and the per-employee record built from them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::employee::{Employee, EmployeeId};

/// A clock-in/clock-out pair as stored for one employee on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAttendanceEntry {
    /// The employee who punched.
    pub employee_id: EmployeeId,
    /// The calendar day the punches belong to.
    pub date: NaiveDate,
    /// Clock-in time as "HH:MM[:SS]", absent when no punch was recorded.
    #[serde(default)]
    pub start_time: Option<String>,
    /// Clock-out time as "HH:MM[:SS]", absent when no punch was recorded.
    #[serde(default)]
    pub end_time: Option<String>,
    /// Soft-delete flag owned by the storage layer.
    #[serde(default)]
    pub deleted: bool,
}

/// Kind of request a ticket represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketType {
    /// Day off.
    Leave,
    /// Arriving after the start of day.
    LateArrival,
    /// Leaving before the end of day.
    EarlyDeparture,
    /// Extra hours.
    Overtime,
}

/// Review state of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalState {
    /// Waiting for an approver.
    Pending,
    /// Accepted by an approver.
    Approved,
    /// Declined by an approver.
    Rejected,
}

/// A leave or lateness request tied to one employee and one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveTicket {
    /// The employee the ticket belongs to.
    pub employee_id: EmployeeId,
    /// The calendar day the ticket covers.
    pub date: NaiveDate,
    /// What the ticket requests.
    pub ticket_type: TicketType,
    /// Where the ticket is in review.
    pub approval_state: ApprovalState,
    /// Free-text note from the requester.
    #[serde(default)]
    pub note: Option<String>,
    /// Soft-delete flag owned by the storage layer.
    #[serde(default)]
    pub deleted: bool,
}

impl LeaveTicket {
    /// Returns true for an approved day-off ticket.
    pub fn is_approved_leave(&self) -> bool {
        self.ticket_type == TicketType::Leave && self.approval_state == ApprovalState::Approved
    }
}

/// One day of attendance for an employee, enriched for the report.
///
/// `worked_minutes` is always computed from the raw punches. The display
/// times are filled in later by the normalizer and are consistent with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayEntry {
    /// The calendar day.
    pub date: NaiveDate,
    /// Raw clock-in time.
    pub start_time: Option<String>,
    /// Raw clock-out time.
    pub end_time: Option<String>,
    /// Policy-adjusted worked minutes: a multiple of 15, at most 480.
    pub worked_minutes: u32,
    /// Normalized "HH:MM" start used for display.
    #[serde(default)]
    pub display_start: Option<String>,
    /// Normalized "HH:MM" end used for display.
    #[serde(default)]
    pub display_end: Option<String>,
    /// Approved tickets filed for this day.
    #[serde(default)]
    pub tickets: Vec<LeaveTicket>,
}

impl DayEntry {
    /// Returns true when an approved leave ticket covers this day.
    pub fn is_approved_leave(&self) -> bool {
        self.tickets.iter().any(LeaveTicket::is_approved_leave)
    }

    /// Worked time in hours.
    ///
    /// # Example
    ///
    /// ```
    /// use attendance_report::models::DayEntry;
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let entry = DayEntry {
    ///     date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
    ///     start_time: Some("08:00".to_string()),
    ///     end_time: Some("17:30".to_string()),
    ///     worked_minutes: 450,
    ///     display_start: None,
    ///     display_end: None,
    ///     tickets: vec![],
    /// };
    /// assert_eq!(entry.worked_hours(), Decimal::new(75, 1)); // 7.5
    /// ```
    pub fn worked_hours(&self) -> Decimal {
        Decimal::from(self.worked_minutes) / Decimal::from(60)
    }
}

/// Everything the report needs about one employee over the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// The employee.
    pub employee: Employee,
    /// One entry per day with punches, ordered by date.
    pub days: Vec<DayEntry>,
}

impl AttendanceRecord {
    /// Finds the entry for a calendar day.
    pub fn day(&self, date: NaiveDate) -> Option<&DayEntry> {
        self.days.iter().find(|d| d.date == date)
    }

    /// Sum of worked minutes across the period.
    pub fn total_worked_minutes(&self) -> u32 {
        self.days.iter().map(|d| d.worked_minutes).sum()
    }
}
