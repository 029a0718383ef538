//! Core data models for the attendance report engine.
//!
//! This module contains all the domain models used throughout the engine.

mod attendance;
mod employee;
mod project;
mod report_period;

pub use attendance::{
    ApprovalState, AttendanceRecord, DayEntry, LeaveTicket, RawAttendanceEntry, TicketType,
};
pub use employee::{
    Employee, EmployeeId, LUNCH_START_MINUTES, ShiftPolicy, WORKDAY_START_MINUTES,
};
pub use project::{Project, ProjectAssignments, ProjectId, UNASSIGNED_PROJECT_ID};
pub use report_period::{ReportPeriod, ReportRequest};
