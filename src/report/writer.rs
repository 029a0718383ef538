//! Workbook rendering and persistence.
//!
//! The finished [`Sheet`] is rendered with `rust_xlsxwriter` and written to a
//! temporary file next to the destination, which is then renamed into place.
//! A failed export therefore never leaves a partial file at the destination.

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use tracing::info;

use crate::error::{ReportError, ReportResult};

use super::references::CellRef;
use super::sheet::{CellValue, Sheet};
use super::style::{CellStyle, HorizontalAlign};

/// Paper size code for A4.
const PAPER_A4: u8 = 9;

fn to_format(style: &CellStyle) -> Format {
    let mut format = Format::new();
    if style.bold == Some(true) {
        format = format.set_bold();
    }
    if style.italic == Some(true) {
        format = format.set_italic();
    }
    if let Some(size) = style.font_size {
        format = format.set_font_size(size);
    }
    if let Some(color) = style.font_color {
        format = format.set_font_color(color.0);
    }
    if let Some(fill) = style.fill {
        format = format.set_background_color(fill.0);
    }
    if style.border == Some(true) {
        format = format.set_border(FormatBorder::Thin);
    }
    if let Some(align) = style.align {
        format = format.set_align(match align {
            HorizontalAlign::Left => FormatAlign::Left,
            HorizontalAlign::Center => FormatAlign::Center,
            HorizontalAlign::Right => FormatAlign::Right,
        });
    }
    if style.vertical_center == Some(true) {
        format = format.set_align(FormatAlign::VerticalCenter);
    }
    if style.wrap == Some(true) {
        format = format.set_text_wrap();
    }
    if let Some(num_format) = &style.num_format {
        format = format.set_num_format(num_format);
    }
    format
}

fn write_value(
    worksheet: &mut Worksheet,
    at: CellRef,
    value: &CellValue,
    format: Option<&Format>,
) -> Result<(), XlsxError> {
    let (row, col) = (at.row, at.col);
    match (value, format) {
        (CellValue::Empty, Some(format)) => {
            worksheet.write_blank(row, col, format)?;
        }
        (CellValue::Empty, None) => {}
        (CellValue::Number(n), Some(format)) => {
            worksheet.write_number_with_format(row, col, *n, format)?;
        }
        (CellValue::Number(n), None) => {
            worksheet.write_number(row, col, *n)?;
        }
        (CellValue::Text(text), Some(format)) => {
            worksheet.write_string_with_format(row, col, text, format)?;
        }
        (CellValue::Text(text), None) => {
            worksheet.write_string(row, col, text)?;
        }
        (CellValue::Formula(formula), Some(format)) => {
            worksheet.write_formula_with_format(row, col, formula.as_str(), format)?;
        }
        (CellValue::Formula(formula), None) => {
            worksheet.write_formula(row, col, formula.as_str())?;
        }
    }
    Ok(())
}

/// Renders a sheet into a single-worksheet workbook.
pub fn render_workbook(sheet: &Sheet) -> Result<Workbook, XlsxError> {
    let formats: HashMap<&str, Format> = sheet
        .styles()
        .map(|(name, style)| (name.as_str(), to_format(style)))
        .collect();
    let format_of = |at: CellRef| sheet.style_name(at).and_then(|name| formats.get(name));

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet.name())?;

    for (col, width) in sheet.column_widths() {
        worksheet.set_column_width(*col, *width)?;
    }
    for (row, height) in sheet.row_heights() {
        worksheet.set_row_height(*row, *height)?;
    }

    // Only the top-left cell of a merge carries a value.
    let mut covered = HashSet::new();
    for merge in sheet.merges() {
        let default_format = Format::new();
        let format = format_of(merge.first).unwrap_or(&default_format);
        worksheet.merge_range(
            merge.first.row,
            merge.first.col,
            merge.last.row,
            merge.last.col,
            "",
            format,
        )?;
        covered.extend(merge.cells().filter(|c| *c != merge.first));
    }

    for (at, cell) in sheet.cells() {
        if covered.contains(at) {
            continue;
        }
        write_value(worksheet, *at, &cell.value, format_of(*at))?;
    }

    let setup = sheet.page_setup();
    worksheet.set_paper_size(PAPER_A4);
    if setup.landscape {
        worksheet.set_landscape();
    }
    if setup.fit_to_width {
        worksheet.set_print_fit_to_pages(1, 0);
    }
    if let Some(area) = setup.print_area {
        worksheet.set_print_area(area.first.row, area.first.col, area.last.row, area.last.col)?;
    }
    if let Some((first, last)) = setup.repeat_rows {
        worksheet.set_repeat_rows(first, last)?;
    }
    if !setup.page_breaks.is_empty() {
        worksheet.set_page_breaks(&setup.page_breaks)?;
    }

    Ok(workbook)
}

/// Renders `sheet` and writes it to `destination`.
///
/// The bytes go to a temporary file in the destination directory first; the
/// file only appears at `destination` once it is complete.
///
/// # Errors
///
/// Returns [`ReportError::WriteFailed`] if rendering fails, the directory is
/// not writable or the final rename fails.
pub fn write_report(sheet: &Sheet, destination: &Path) -> ReportResult<PathBuf> {
    let label = destination.display().to_string();
    let failed = |message: String| ReportError::WriteFailed {
        path: label.clone(),
        message,
    };

    let mut workbook = render_workbook(sheet).map_err(|e| failed(e.to_string()))?;
    let buffer = workbook.save_to_buffer().map_err(|e| failed(e.to_string()))?;

    let directory = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = tempfile::Builder::new()
        .prefix(".attendance-")
        .suffix(".xlsx.tmp")
        .tempfile_in(directory)
        .map_err(|e| failed(e.to_string()))?;
    staged.write_all(&buffer).map_err(|e| failed(e.to_string()))?;
    staged
        .as_file()
        .sync_all()
        .map_err(|e| failed(e.to_string()))?;
    staged
        .persist(destination)
        .map_err(|e| failed(e.error.to_string()))?;

    info!(path = %label, bytes = buffer.len(), "Report written");
    Ok(destination.to_path_buf())
}
