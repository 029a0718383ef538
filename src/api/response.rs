//! Response types for the attendance report API.
//!
//! This module defines the preview payload, the error response structures
//! and the mapping from [`ReportError`] to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::models::{AttendanceRecord, DayEntry, EmployeeId, ReportPeriod};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<&ReportError> for ApiErrorResponse {
    fn from(error: &ReportError) -> Self {
        let message = error.to_string();
        let (status, error) = match error {
            ReportError::Format { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "INVALID_TIME",
                    message,
                    "A stored clock time could not be read",
                ),
            ),
            ReportError::InvalidPeriod { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_PERIOD", message),
            ),
            ReportError::InvalidShiftPolicy { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "INVALID_SHIFT_POLICY",
                    message,
                    "Supported shift policy codes are 0 and 30",
                ),
            ),
            ReportError::InvalidFileName { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_FILE_NAME", message),
            ),
            ReportError::TemplateMissing { .. }
            | ReportError::TemplateUnreadable { .. }
            | ReportError::WorksheetAbsent { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("TEMPLATE_ERROR", "Template error", message),
            ),
            ReportError::ConfigNotFound { .. } | ReportError::ConfigParseError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
            ReportError::Storage { .. } => (
                StatusCode::BAD_GATEWAY,
                ApiError::with_details("STORAGE_ERROR", "Attendance store failed", message),
            ),
            ReportError::WriteFailed { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("WRITE_FAILED", "Report could not be written", message),
            ),
        };
        ApiErrorResponse { status, error }
    }
}

impl From<ReportError> for ApiErrorResponse {
    fn from(error: ReportError) -> Self {
        Self::from(&error)
    }
}

/// One day of a previewed attendance record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPreview {
    /// The calendar day.
    pub date: NaiveDate,
    /// Raw clock-in time.
    pub start_time: Option<String>,
    /// Raw clock-out time.
    pub end_time: Option<String>,
    /// Normalized start shown in the report.
    pub display_start: Option<String>,
    /// Normalized end shown in the report.
    pub display_end: Option<String>,
    /// Credited hours.
    pub worked_hours: Decimal,
    /// An approved leave ticket covers the day.
    pub on_leave: bool,
}

impl From<&DayEntry> for DayPreview {
    fn from(day: &DayEntry) -> Self {
        Self {
            date: day.date,
            start_time: day.start_time.clone(),
            end_time: day.end_time.clone(),
            display_start: day.display_start.clone(),
            display_end: day.display_end.clone(),
            worked_hours: day.worked_hours(),
            on_leave: day.is_approved_leave(),
        }
    }
}

/// One employee's previewed attendance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeePreview {
    /// The employee id.
    pub employee_id: EmployeeId,
    /// Display name.
    pub name: String,
    /// Login name.
    pub username: String,
    /// Shift policy code.
    pub shift_policy: i32,
    /// Credited hours over the period.
    pub total_hours: Decimal,
    /// Days with punches.
    pub days: Vec<DayPreview>,
}

impl From<&AttendanceRecord> for EmployeePreview {
    fn from(record: &AttendanceRecord) -> Self {
        Self {
            employee_id: record.employee.id,
            name: record.employee.name.clone(),
            username: record.employee.username.clone(),
            shift_policy: record.employee.shift_policy.code(),
            total_hours: Decimal::from(record.total_worked_minutes()) / Decimal::from(60),
            days: record.days.iter().map(DayPreview::from).collect(),
        }
    }
}

/// Response body for the `/attendance` preview endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendancePreview {
    /// The first day of the period.
    pub start_date: NaiveDate,
    /// The last day of the period.
    pub end_date: NaiveDate,
    /// Weekdays in the period.
    pub business_days: u32,
    /// Records in roster order.
    pub employees: Vec<EmployeePreview>,
}

impl AttendancePreview {
    /// Builds a preview from normalized records.
    pub fn new(period: &ReportPeriod, records: &[AttendanceRecord]) -> Self {
        Self {
            start_date: period.start_date,
            end_date: period.end_date,
            business_days: period.business_day_count(),
            employees: records.iter().map(EmployeePreview::from).collect(),
        }
    }
}
