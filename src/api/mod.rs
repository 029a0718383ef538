//! HTTP API module for the attendance report service.
//!
//! This module provides the REST API endpoints for previewing aggregated
//! attendance and exporting the worksheet.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::AttendanceQuery;
pub use response::{ApiError, ApiErrorResponse, AttendancePreview, DayPreview, EmployeePreview};
pub use state::AppState;
