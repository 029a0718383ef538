//! Template-driven worksheet synthesis.
//!
//! This module contains:
//! - [`Template`]: the YAML worksheet template and its anchors
//! - [`Sheet`]: the in-memory worksheet the report is assembled on
//! - [`ReportLayout`]: row and column planning
//! - [`ReportBuilder`]: the phased synthesis engine
//! - [`write_report`]: rendering and atomic persistence
//! - [`ReportExporter`]: the end-to-end export pipeline

mod export;
mod layout;
mod references;
mod sheet;
mod style;
mod synthesis;
mod template;
mod writer;

pub use export::{
    CANCELLED_MESSAGE, DestinationPicker, ExportOutcome, ExportResult, OutputDirectory,
    ReportExporter, requested_file_name, suggested_file_name, unique_path,
};
pub use layout::{BlockRow, FIXED_BLOCK_ROWS, ReportLayout, SUMMARY_GAP_ROWS, SignatureLayout};
pub use references::{
    Axis, CellRange, CellRef, ColNum, RowNum, column_index, column_name, shift_formula_references,
    shift_span,
};
pub use sheet::{Cell, CellValue, PageSetup, Sheet};
pub use style::{CellStyle, HexColor, HorizontalAlign};
pub use synthesis::{ExportContext, Phase, ReportBuilder};
pub use template::{TEMPLATE_BLOCK_ROWS, Template, TemplateAnchors, styles};
pub use writer::{render_workbook, write_report};
