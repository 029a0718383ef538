//! Request types for the attendance report API.
//!
//! `/attendance` takes an [`AttendanceQuery`]; `/export` takes a
//! [`ReportRequest`](crate::models::ReportRequest) directly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ReportResult;
use crate::models::{EmployeeId, ReportPeriod};

/// Request body for the `/attendance` preview endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceQuery {
    /// Employees to include.
    pub employee_ids: Vec<EmployeeId>,
    /// The first day of the period (inclusive).
    pub start_date: NaiveDate,
    /// The last day of the period (inclusive).
    pub end_date: NaiveDate,
}

impl AttendanceQuery {
    /// The validated period of this query.
    pub fn period(&self) -> ReportResult<ReportPeriod> {
        ReportPeriod::new(self.start_date, self.end_date)
    }
}
