//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the report
//! service configuration from a YAML file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ReportError, ReportResult};
use crate::report::{OutputDirectory, ReportExporter};

use super::types::ReportConfig;

/// Name of the configuration file inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "report.yaml";

/// Loads and provides access to the report configuration.
///
/// # Directory Structure
///
/// ```text
/// config/
/// ├── report.yaml             # Service configuration
/// ├── demo_store.yaml         # Demo attendance data (optional)
/// └── templates/
///     └── attendance.yaml     # Worksheet template
/// ```
///
/// # Example
///
/// ```no_run
/// use attendance_report::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config").unwrap();
/// println!("Template: {}", loader.template_path().display());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: ReportConfig,
}

impl ConfigLoader {
    /// Loads `report.yaml` from the specified directory.
    ///
    /// Relative paths in the file are resolved against `path`.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - The file is missing ([`ReportError::ConfigNotFound`])
    /// - The file contains invalid YAML or unknown keys ([`ReportError::ConfigParseError`])
    pub fn load<P: AsRef<Path>>(path: P) -> ReportResult<Self> {
        let path = path.as_ref();
        let mut config = Self::load_yaml::<ReportConfig>(&path.join(CONFIG_FILE_NAME))?;

        config.template = resolve(path, &config.template);
        config.output_dir = resolve(path, &config.output_dir);
        config.data = config.data.as_deref().map(|data| resolve(path, data));

        Ok(Self { config })
    }

    /// Wraps an already built configuration; paths are used as given.
    pub fn from_config(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> ReportResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| ReportError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| ReportError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the full configuration.
    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// The worksheet template path.
    pub fn template_path(&self) -> &Path {
        &self.config.template
    }

    /// The default output directory.
    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    /// The address the server binds to.
    pub fn listen_addr(&self) -> &str {
        &self.config.listen
    }

    /// The demo data file, if configured.
    pub fn data_path(&self) -> Option<&Path> {
        self.config.data.as_deref()
    }

    /// An exporter for the configured template and file-name pattern.
    pub fn exporter(&self) -> ReportExporter {
        ReportExporter::new(&self.config.template, &self.config.file_name_pattern)
    }

    /// The default destination picker.
    pub fn destination_picker(&self) -> OutputDirectory {
        OutputDirectory::new(&self.config.output_dir)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
