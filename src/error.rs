//! Error types for the attendance report engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure that can occur between reading attendance data and
//! writing the finished workbook.

use thiserror::Error;

/// The main error type for the attendance report engine.
///
/// # Example
///
/// ```
/// use attendance_report::error::ReportError;
///
/// let error = ReportError::TemplateMissing {
///     path: "/missing/attendance.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Template file not found: /missing/attendance.yaml");
/// ```
#[derive(Debug, Error)]
pub enum ReportError {
    /// A wall-clock time string could not be parsed.
    #[error("Invalid time format '{value}': expected H:MM or H:MM:SS")]
    Format {
        /// The offending input.
        value: String,
    },

    /// The worksheet template does not exist.
    #[error("Template file not found: {path}")]
    TemplateMissing {
        /// The path that was not found.
        path: String,
    },

    /// The worksheet template exists but could not be read or parsed.
    #[error("Failed to read template '{path}': {message}")]
    TemplateUnreadable {
        /// The path to the template.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// The template does not contain exactly one worksheet.
    #[error("Template '{path}' has no usable worksheet")]
    WorksheetAbsent {
        /// The path to the template.
        path: String,
    },

    /// The requested reporting period cannot be rendered.
    #[error("Invalid reporting period: {message}")]
    InvalidPeriod {
        /// A description of what made the period invalid.
        message: String,
    },

    /// A shift policy code outside the supported set.
    #[error("Unsupported shift policy code: {code}")]
    InvalidShiftPolicy {
        /// The rejected code.
        code: i32,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A requested file name is not a plain `.xlsx` file name.
    #[error("Invalid file name '{name}': {message}")]
    InvalidFileName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        message: String,
    },

    /// The attendance store failed to answer a query.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the storage failure.
        message: String,
    },

    /// The workbook could not be written to its destination.
    #[error("Failed to write report '{path}': {message}")]
    WriteFailed {
        /// The destination path.
        path: String,
        /// A description of the write failure.
        message: String,
    },
}

/// A type alias for Results that return ReportError.
pub type ReportResult<T> = Result<T, ReportError>;
