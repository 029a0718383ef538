//! Configuration types for the attendance report service.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from `report.yaml`.

use std::path::PathBuf;

use serde::Deserialize;

fn default_file_name_pattern() -> String {
    "ChamCong_{start}_{end}.xlsx".to_string()
}

fn default_listen() -> String {
    "127.0.0.1:3000".to_string()
}

/// Report service configuration.
///
/// Relative paths are resolved against the configuration directory by
/// [`super::ConfigLoader`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// The worksheet template.
    pub template: PathBuf,
    /// Directory the default destination picker saves into.
    pub output_dir: PathBuf,
    /// Suggested file name; `{start}` and `{end}` expand to `YYYYMMDD`.
    #[serde(default = "default_file_name_pattern")]
    pub file_name_pattern: String,
    /// Address the HTTP server binds to.
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Optional attendance data file served by the in-memory store.
    #[serde(default)]
    pub data: Option<PathBuf>,
}
