//! The export pipeline.
//!
//! An export aggregates attendance for the requested employees, normalizes
//! display times, builds the worksheet from the template, asks for a
//! destination and writes the file. [`ExportResult`] is the flat
//! success/failure contract handed back to callers.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::aggregation::{AttendanceStore, aggregate_attendance};
use crate::calculation::format_attendance_times;
use crate::error::{ReportError, ReportResult};
use crate::models::{AttendanceRecord, Project, ReportPeriod, ReportRequest};

use super::synthesis::{ExportContext, ReportBuilder};
use super::template::Template;
use super::writer::write_report;

/// Message reported when the user declines to pick a destination.
pub const CANCELLED_MESSAGE: &str = "Đã hủy lưu file / Export cancelled";

/// How an export ended when nothing went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The workbook was written.
    Saved {
        /// Where it was written.
        file_path: PathBuf,
    },
    /// No destination was chosen; nothing was written.
    Cancelled,
}

/// The result contract: `{success, file_path?, error?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportResult {
    /// Whether a file was written.
    pub success: bool,
    /// Path of the written file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// Why nothing was written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExportResult {
    /// A failed export.
    pub fn failed(error: &ReportError) -> Self {
        Self {
            success: false,
            file_path: None,
            error: Some(error.to_string()),
        }
    }
}

impl From<ExportOutcome> for ExportResult {
    fn from(outcome: ExportOutcome) -> Self {
        match outcome {
            ExportOutcome::Saved { file_path } => Self {
                success: true,
                file_path: Some(file_path.display().to_string()),
                error: None,
            },
            ExportOutcome::Cancelled => Self {
                success: false,
                file_path: None,
                error: Some(CANCELLED_MESSAGE.to_string()),
            },
        }
    }
}

impl From<&ReportResult<ExportOutcome>> for ExportResult {
    fn from(result: &ReportResult<ExportOutcome>) -> Self {
        match result {
            Ok(outcome) => outcome.clone().into(),
            Err(error) => Self::failed(error),
        }
    }
}

/// Chooses where a report is saved.
///
/// Returning `None` cancels the export.
pub trait DestinationPicker: Send + Sync {
    /// Picks a destination given the suggested file name.
    fn pick(&self, suggested_file_name: &str) -> Option<PathBuf>;
}

/// Saves into a fixed directory, never overwriting an existing file.
#[derive(Debug, Clone)]
pub struct OutputDirectory {
    directory: PathBuf,
}

impl OutputDirectory {
    /// Creates a picker for `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

impl DestinationPicker for OutputDirectory {
    fn pick(&self, suggested_file_name: &str) -> Option<PathBuf> {
        Some(unique_path(&self.directory, suggested_file_name))
    }
}

/// `directory/file_name`, or `stem_N.ext` with the first free `N` when taken.
///
/// # Example
///
/// ```
/// use attendance_report::report::unique_path;
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::write(dir.path().join("report.xlsx"), b"").unwrap();
///
/// assert_eq!(unique_path(dir.path(), "report.xlsx"), dir.path().join("report_1.xlsx"));
/// ```
pub fn unique_path(directory: &Path, file_name: &str) -> PathBuf {
    let candidate = directory.join(file_name);
    if !candidate.exists() {
        return candidate;
    }
    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    let extension = name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 1u32;
    loop {
        let candidate = directory.join(format!("{}_{}{}", stem, n, extension));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Expands `{start}` and `{end}` in a file-name pattern and ensures an
/// `.xlsx` extension.
///
/// # Example
///
/// ```
/// use attendance_report::models::ReportPeriod;
/// use attendance_report::report::suggested_file_name;
/// use chrono::NaiveDate;
///
/// let period = ReportPeriod::new(
///     NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
/// ).unwrap();
/// assert_eq!(
///     suggested_file_name("ChamCong_{start}_{end}", &period),
///     "ChamCong_20250301_20250331.xlsx"
/// );
/// ```
pub fn suggested_file_name(pattern: &str, period: &ReportPeriod) -> String {
    let name = pattern
        .replace("{start}", &period.start_date.format("%Y%m%d").to_string())
        .replace("{end}", &period.end_date.format("%Y%m%d").to_string());
    if name.to_ascii_lowercase().ends_with(".xlsx") {
        name
    } else {
        format!("{}.xlsx", name)
    }
}

/// Checks a caller-supplied file name and ensures an `.xlsx` extension.
///
/// Only a bare name is accepted. Anything that would place the file outside
/// the picker's directory, or hide it among temporary files, is rejected.
///
/// # Example
///
/// ```
/// use attendance_report::report::requested_file_name;
///
/// assert_eq!(requested_file_name("march").unwrap(), "march.xlsx");
/// assert!(requested_file_name("../march.xlsx").is_err());
/// assert!(requested_file_name("march.txt").is_err());
/// ```
pub fn requested_file_name(name: &str) -> ReportResult<String> {
    let invalid = |message: &str| ReportError::InvalidFileName {
        name: name.to_string(),
        message: message.to_string(),
    };

    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if trimmed.contains(['/', '\\', ':', '\0']) {
        return Err(invalid("must be a file name, not a path"));
    }
    if trimmed.starts_with('.') {
        return Err(invalid("must not start with '.'"));
    }

    match Path::new(trimmed).extension() {
        None => Ok(format!("{}.xlsx", trimmed)),
        Some(ext) if ext.eq_ignore_ascii_case("xlsx") => Ok(trimmed.to_string()),
        Some(_) => Err(invalid("must have an .xlsx extension")),
    }
}

/// Runs exports against a template.
#[derive(Debug, Clone)]
pub struct ReportExporter {
    template_path: PathBuf,
    file_name_pattern: String,
}

impl ReportExporter {
    /// Creates an exporter.
    pub fn new(template_path: impl Into<PathBuf>, file_name_pattern: impl Into<String>) -> Self {
        Self {
            template_path: template_path.into(),
            file_name_pattern: file_name_pattern.into(),
        }
    }

    /// The template this exporter loads.
    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    /// Aggregates the requested attendance and exports it.
    ///
    /// A file name on the request replaces the suggested one; the picker
    /// still chooses where it goes.
    pub async fn export(
        &self,
        store: &dyn AttendanceStore,
        request: &ReportRequest,
        picker: &dyn DestinationPicker,
    ) -> ReportResult<ExportOutcome> {
        let period = request.period()?;
        let file_name = request
            .file_name
            .as_deref()
            .map(requested_file_name)
            .transpose()?;
        let records = aggregate_attendance(store, &request.employee_ids, &period).await?;
        self.export_records(
            records,
            period,
            request.projects.clone(),
            file_name,
            picker,
        )
        .await
    }

    /// Exports already aggregated records.
    ///
    /// The template is loaded and the worksheet fully built before a
    /// destination is requested, so a bad template never creates a file.
    /// `file_name`, when given, is validated with [`requested_file_name`]
    /// and offered to the picker in place of the configured pattern.
    pub async fn export_records(
        &self,
        records: Vec<AttendanceRecord>,
        period: ReportPeriod,
        projects: Vec<Project>,
        file_name: Option<String>,
        picker: &dyn DestinationPicker,
    ) -> ReportResult<ExportOutcome> {
        let file_name = file_name.as_deref().map(requested_file_name).transpose()?;
        let employees = records.len();
        let normalized = format_attendance_times(&records)?;
        let context = ExportContext::new(period, normalized, projects);

        let template = Template::load(&self.template_path)?;
        let sheet = ReportBuilder::new(template, &context)?.build()?;

        let suggested = file_name
            .unwrap_or_else(|| suggested_file_name(&self.file_name_pattern, &context.period));
        let Some(path) = picker.pick(&suggested) else {
            warn!(suggested = %suggested, "Export cancelled, no destination chosen");
            return Ok(ExportOutcome::Cancelled);
        };

        let label = path.display().to_string();
        let file_path = tokio::task::spawn_blocking(move || write_report(&sheet, &path))
            .await
            .map_err(|e| ReportError::WriteFailed {
                path: label,
                message: e.to_string(),
            })??;

        info!(
            path = %file_path.display(),
            employees,
            start = %context.period.start_date,
            end = %context.period.end_date,
            "Attendance report exported"
        );
        Ok(ExportOutcome::Saved { file_path })
    }
}
