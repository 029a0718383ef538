//! The worksheet template.
//!
//! The report starts from a template describing one worksheet: named styles,
//! column widths, row heights, static labels, merges and a set of anchors
//! telling the builder where the period cells, the date header and the
//! per-employee template block live. Templates are YAML documents, not
//! `.xlsx` files: `rust_xlsxwriter` only writes workbooks, so a layout
//! changed in a spreadsheet application must be mirrored in the YAML by hand.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ReportError, ReportResult};

use super::references::{CellRange, CellRef, ColNum, RowNum, column_index};
use super::sheet::Sheet;
use super::style::CellStyle;

/// Style names the report builder applies on top of the template layout.
pub mod styles {
    /// Fill layered over weekend date columns.
    pub const WEEKEND: &str = "weekend";
    /// Highlight layered over the assigned project row.
    pub const ASSIGNED: &str = "assigned";
    /// Marker layered over a start cell with approved tickets.
    pub const TICKET: &str = "ticket";
    /// Marker layered over a start cell on approved leave.
    pub const LEAVE: &str = "leave";
    /// Summary table header cells.
    pub const SUMMARY_HEADER: &str = "summary_header";
    /// Summary table label cells.
    pub const SUMMARY_LABEL: &str = "summary_label";
    /// Summary table hour totals.
    pub const SUMMARY_VALUE: &str = "summary_value";
    /// Occupancy ratio.
    pub const PERCENT: &str = "percent";
    /// Signature captions.
    pub const SIGNATURE: &str = "signature";
    /// Signature hints below the captions.
    pub const SIGNATURE_NOTE: &str = "signature_note";

    /// Every style that must be declared by a template.
    pub const REQUIRED: [&str; 10] = [
        WEEKEND,
        ASSIGNED,
        TICKET,
        LEAVE,
        SUMMARY_HEADER,
        SUMMARY_LABEL,
        SUMMARY_VALUE,
        PERCENT,
        SIGNATURE,
        SIGNATURE_NOTE,
    ];
}

/// Number of rows in the template's per-employee block: start, closing,
/// break, day total, project prototype and W.T. total.
pub const TEMPLATE_BLOCK_ROWS: u32 = 6;

/// Where the builder finds the fixed parts of the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateAnchors {
    /// Cell receiving the period start date.
    pub period_start: CellRef,
    /// Cell receiving the business-day count.
    pub business_days: CellRef,
    /// Caption cell above the date columns.
    pub caption: CellRef,
    /// First date label cell; its column is the first date column.
    pub date_labels: CellRef,
    /// First weekday label cell.
    pub weekday_labels: CellRef,
    /// Number of date columns laid out in the template.
    pub date_columns: u16,
    /// Header rows repeated on every printed page (inclusive).
    pub header_rows: (RowNum, RowNum),
    /// First row of the per-employee template block.
    pub block_start: RowNum,
}

impl TemplateAnchors {
    /// The first date column.
    pub fn first_date_col(&self) -> ColNum {
        self.date_labels.col
    }

    /// The row-total column as laid out in the template.
    pub fn total_col(&self) -> ColNum {
        self.first_date_col() + self.date_columns
    }
}

/// A loaded template: the worksheet plus its anchors.
#[derive(Debug, Clone)]
pub struct Template {
    /// The worksheet, as described by the template.
    pub sheet: Sheet,
    /// The anchors.
    pub anchors: TemplateAnchors,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TemplateDocument {
    #[serde(default)]
    worksheets: Vec<WorksheetDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WorksheetDocument {
    name: String,
    #[serde(default)]
    styles: BTreeMap<String, CellStyle>,
    #[serde(default)]
    columns: Vec<ColumnSpec>,
    #[serde(default)]
    rows: Vec<RowSpec>,
    #[serde(default)]
    cells: Vec<CellSpec>,
    #[serde(default)]
    merges: Vec<String>,
    anchors: AnchorSpec,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ColumnSpec {
    columns: String,
    width: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RowSpec {
    row: RowNum,
    height: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CellSpec {
    #[serde(default)]
    at: Option<String>,
    #[serde(default)]
    range: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    number: Option<f64>,
    #[serde(default)]
    formula: Option<String>,
    #[serde(default)]
    style: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AnchorSpec {
    period_start: String,
    business_days: String,
    caption: String,
    date_labels: String,
    weekday_labels: String,
    date_columns: u16,
    header_rows: String,
    block_start: RowNum,
}

impl Template {
    /// Loads a template file.
    ///
    /// # Errors
    ///
    /// - [`ReportError::TemplateMissing`] if the file does not exist
    /// - [`ReportError::TemplateUnreadable`] if it cannot be read or is malformed
    /// - [`ReportError::WorksheetAbsent`] if it declares no worksheet
    pub fn load<P: AsRef<Path>>(path: P) -> ReportResult<Self> {
        let path = path.as_ref();
        let label = path.display().to_string();

        if !path.exists() {
            return Err(ReportError::TemplateMissing { path: label });
        }

        let content = fs::read_to_string(path).map_err(|e| ReportError::TemplateUnreadable {
            path: label.clone(),
            message: e.to_string(),
        })?;

        let template = Self::parse(&content, &label)?;
        debug!(
            template = %label,
            worksheet = template.sheet.name(),
            "Loaded report template"
        );
        Ok(template)
    }

    /// Parses a template document. `label` names the source in errors.
    pub fn parse(content: &str, label: &str) -> ReportResult<Self> {
        let unreadable = |message: String| ReportError::TemplateUnreadable {
            path: label.to_string(),
            message,
        };

        let document: TemplateDocument =
            serde_yaml::from_str(content).map_err(|e| unreadable(e.to_string()))?;

        let mut worksheets = document.worksheets.into_iter();
        let Some(worksheet) = worksheets.next() else {
            return Err(ReportError::WorksheetAbsent {
                path: label.to_string(),
            });
        };
        if worksheets.next().is_some() {
            warn!(template = label, "Template declares several worksheets; using the first");
        }

        build_template(worksheet).map_err(unreadable)
    }
}

fn cell_ref(value: &str, field: &str) -> Result<CellRef, String> {
    CellRef::from_a1(value).ok_or_else(|| format!("{}: invalid cell reference '{}'", field, value))
}

fn cell_range(value: &str, field: &str) -> Result<CellRange, String> {
    CellRange::from_a1(value).ok_or_else(|| format!("{}: invalid range '{}'", field, value))
}

fn column_span(value: &str) -> Result<(ColNum, ColNum), String> {
    let parse = |s: &str| {
        column_index(s.trim()).ok_or_else(|| format!("columns: invalid column '{}'", value))
    };
    match value.split_once(':') {
        Some((a, b)) => {
            let (a, b) = (parse(a)?, parse(b)?);
            Ok((a.min(b), a.max(b)))
        }
        None => {
            let c = parse(value)?;
            Ok((c, c))
        }
    }
}

fn row_span(value: &str) -> Result<(RowNum, RowNum), String> {
    let parse = |s: &str| -> Result<RowNum, String> {
        match s.trim().parse::<RowNum>() {
            Ok(n) if n > 0 => Ok(n - 1),
            _ => Err(format!("header_rows: invalid row '{}'", value)),
        }
    };
    match value.split_once(':') {
        Some((a, b)) => {
            let (a, b) = (parse(a)?, parse(b)?);
            Ok((a.min(b), a.max(b)))
        }
        None => {
            let r = parse(value)?;
            Ok((r, r))
        }
    }
}

fn build_template(worksheet: WorksheetDocument) -> Result<Template, String> {
    if worksheet.name.trim().is_empty() {
        return Err("worksheet name is empty".to_string());
    }

    let mut sheet = Sheet::new(worksheet.name);

    for required in styles::REQUIRED {
        if !worksheet.styles.contains_key(required) {
            return Err(format!("missing required style '{}'", required));
        }
    }
    for (name, style) in &worksheet.styles {
        sheet.define_style(name.clone(), style.clone());
    }

    for column in &worksheet.columns {
        let (first, last) = column_span(&column.columns)?;
        for col in first..=last {
            sheet.set_column_width(col, column.width);
        }
    }

    for row in &worksheet.rows {
        if row.row == 0 {
            return Err("rows: row numbers start at 1".to_string());
        }
        sheet.set_row_height(row.row - 1, row.height);
    }

    for cell in &worksheet.cells {
        if let Some(style) = &cell.style {
            if sheet.style(style).is_none() {
                return Err(format!("cells: unknown style '{}'", style));
            }
        }

        match (&cell.at, &cell.range) {
            (Some(at), None) => {
                let at = cell_ref(at, "cells")?;
                if let Some(style) = &cell.style {
                    sheet.set_style(at, style.clone());
                }
                if let Some(text) = &cell.text {
                    sheet.set_text(at, text.clone());
                } else if let Some(number) = cell.number {
                    sheet.set_number(at, number);
                } else if let Some(formula) = &cell.formula {
                    sheet.set_formula(at, formula.clone());
                }
            }
            (None, Some(range)) => {
                let range = cell_range(range, "cells")?;
                if cell.text.is_some() || cell.number.is_some() || cell.formula.is_some() {
                    return Err(format!(
                        "cells: range {} can only carry a style",
                        range.to_a1()
                    ));
                }
                if let Some(style) = &cell.style {
                    for at in range.cells() {
                        sheet.set_style(at, style.clone());
                    }
                }
            }
            _ => return Err("cells: each entry needs exactly one of 'at' or 'range'".to_string()),
        }
    }

    for merge in &worksheet.merges {
        sheet.merge(cell_range(merge, "merges")?);
    }

    let anchors = TemplateAnchors {
        period_start: cell_ref(&worksheet.anchors.period_start, "anchors.period_start")?,
        business_days: cell_ref(&worksheet.anchors.business_days, "anchors.business_days")?,
        caption: cell_ref(&worksheet.anchors.caption, "anchors.caption")?,
        date_labels: cell_ref(&worksheet.anchors.date_labels, "anchors.date_labels")?,
        weekday_labels: cell_ref(&worksheet.anchors.weekday_labels, "anchors.weekday_labels")?,
        date_columns: worksheet.anchors.date_columns,
        header_rows: row_span(&worksheet.anchors.header_rows)?,
        block_start: worksheet
            .anchors
            .block_start
            .checked_sub(1)
            .ok_or_else(|| "anchors.block_start: row numbers start at 1".to_string())?,
    };
    validate_anchors(&anchors)?;

    Ok(Template { sheet, anchors })
}

fn validate_anchors(anchors: &TemplateAnchors) -> Result<(), String> {
    if anchors.date_columns == 0 {
        return Err("anchors.date_columns must be at least 1".to_string());
    }
    if anchors.weekday_labels.col != anchors.first_date_col() {
        return Err("anchors: date and weekday labels must start in the same column".to_string());
    }
    let header_end = anchors.header_rows.1;
    if anchors.block_start <= header_end
        || anchors.block_start <= anchors.date_labels.row
        || anchors.block_start <= anchors.weekday_labels.row
    {
        return Err("anchors.block_start must lie below the header rows".to_string());
    }
    // The first date column comes after the index, identity and label columns.
    if anchors.first_date_col() < 4 {
        return Err("anchors.date_labels must start at column E or later".to_string());
    }
    for (name, cell) in [
        ("period_start", anchors.period_start),
        ("business_days", anchors.business_days),
    ] {
        if cell.col >= anchors.first_date_col() {
            return Err(format!("anchors.{} must lie left of the date columns", name));
        }
    }
    Ok(())
}
