//! Configuration loading for the attendance report service.
//!
//! This module loads `report.yaml`: the template location, the default output
//! directory and file-name pattern, the listen address and the optional demo
//! data file.
//!
//! # Example
//!
//! ```no_run
//! use attendance_report::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config").unwrap();
//! println!("Saving reports to {}", config.output_dir().display());
//! ```

mod loader;
mod types;

pub use loader::{CONFIG_FILE_NAME, ConfigLoader};
pub use types::ReportConfig;
