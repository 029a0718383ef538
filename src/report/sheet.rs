//! In-memory worksheet model.
//!
//! The report is assembled on a [`Sheet`] and only turned into an `.xlsx`
//! file at the very end. The sheet supports the structural edits the report
//! needs (deleting rows and columns, copying row styles, merging) and keeps
//! formulas, merges and print settings consistent across them.

use std::collections::BTreeMap;

use tracing::warn;

use super::references::{Axis, CellRange, CellRef, ColNum, RowNum, shift_formula_references, shift_span};
use super::style::{CellStyle, layered_style_name};

/// The content of a cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// No content; the cell may still carry a style.
    #[default]
    Empty,
    /// A number. Dates and times are stored as spreadsheet serial values.
    Number(f64),
    /// Literal text.
    Text(String),
    /// A formula, stored with its leading `=`.
    Formula(String),
}

impl CellValue {
    /// The formula text, if this is a formula.
    pub fn as_formula(&self) -> Option<&str> {
        match self {
            CellValue::Formula(f) => Some(f),
            _ => None,
        }
    }

    /// The number, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The text, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// A cell: a value plus an optional style name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    /// The cell content.
    pub value: CellValue,
    /// Name of the style applied to the cell.
    pub style: Option<String>,
}

/// Print settings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageSetup {
    /// Landscape orientation.
    pub landscape: bool,
    /// Scale to one page wide, any number of pages tall.
    pub fit_to_width: bool,
    /// The printed area.
    pub print_area: Option<CellRange>,
    /// Rows repeated at the top of every printed page.
    pub repeat_rows: Option<(RowNum, RowNum)>,
    /// Rows a new page starts at.
    pub page_breaks: Vec<RowNum>,
}

static EMPTY: CellValue = CellValue::Empty;

/// A single worksheet held in memory.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    name: String,
    cells: BTreeMap<CellRef, Cell>,
    merges: Vec<CellRange>,
    column_widths: BTreeMap<ColNum, f64>,
    row_heights: BTreeMap<RowNum, f64>,
    styles: BTreeMap<String, CellStyle>,
    page_setup: PageSetup,
}

impl Sheet {
    /// Creates an empty sheet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// The worksheet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers a named style, replacing any previous definition.
    pub fn define_style(&mut self, name: impl Into<String>, style: CellStyle) {
        self.styles.insert(name.into(), style);
    }

    /// Looks up a named style.
    pub fn style(&self, name: &str) -> Option<&CellStyle> {
        self.styles.get(name)
    }

    /// All named styles.
    pub fn styles(&self) -> impl Iterator<Item = (&String, &CellStyle)> {
        self.styles.iter()
    }

    /// The cell at `at`, if it has content or a style.
    pub fn cell(&self, at: CellRef) -> Option<&Cell> {
        self.cells.get(&at)
    }

    /// The value at `at`; [`CellValue::Empty`] for untouched cells.
    pub fn value(&self, at: CellRef) -> &CellValue {
        self.cells.get(&at).map(|c| &c.value).unwrap_or(&EMPTY)
    }

    /// The style name at `at`.
    pub fn style_name(&self, at: CellRef) -> Option<&str> {
        self.cells.get(&at).and_then(|c| c.style.as_deref())
    }

    /// All populated cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (&CellRef, &Cell)> {
        self.cells.iter()
    }

    /// Sets the value of a cell, keeping its style.
    pub fn set_value(&mut self, at: CellRef, value: CellValue) {
        self.cells.entry(at).or_default().value = value;
    }

    /// Writes a number.
    pub fn set_number(&mut self, at: CellRef, value: f64) {
        self.set_value(at, CellValue::Number(value));
    }

    /// Writes text.
    pub fn set_text(&mut self, at: CellRef, value: impl Into<String>) {
        self.set_value(at, CellValue::Text(value.into()));
    }

    /// Writes a formula; a leading `=` is added when missing.
    pub fn set_formula(&mut self, at: CellRef, formula: impl Into<String>) {
        let formula = formula.into();
        let formula = if formula.starts_with('=') {
            formula
        } else {
            format!("={}", formula)
        };
        self.set_value(at, CellValue::Formula(formula));
    }

    /// Applies a named style to a cell.
    pub fn set_style(&mut self, at: CellRef, style: impl Into<String>) {
        self.cells.entry(at).or_default().style = Some(style.into());
    }

    /// Layers the named `overlay` style over the cell's current style.
    ///
    /// The combined style is registered on first use.
    pub fn layer_style(&mut self, at: CellRef, overlay: &str) {
        let Some(overlay_style) = self.styles.get(overlay).cloned() else {
            warn!(style = overlay, "Unknown overlay style ignored");
            return;
        };
        let base = self.style_name(at).map(str::to_string);
        let name = layered_style_name(base.as_deref(), overlay);
        if !self.styles.contains_key(&name) {
            let base_style = base
                .as_deref()
                .and_then(|b| self.styles.get(b))
                .cloned()
                .unwrap_or_default();
            self.styles.insert(name.clone(), base_style.layered(&overlay_style));
        }
        self.set_style(at, name);
    }

    /// Merges a range of cells. Single cells are ignored and merges that
    /// overlap the new range are dropped.
    pub fn merge(&mut self, range: CellRange) {
        if range.is_single_cell() {
            return;
        }
        self.merges.retain(|m| !intersects(m, &range));
        self.merges.push(range);
    }

    /// The merged ranges.
    pub fn merges(&self) -> &[CellRange] {
        &self.merges
    }

    /// The merge covering `at`, if any.
    pub fn merge_at(&self, at: CellRef) -> Option<&CellRange> {
        self.merges.iter().find(|m| m.contains(at))
    }

    /// Width of a column, if set.
    pub fn column_width(&self, col: ColNum) -> Option<f64> {
        self.column_widths.get(&col).copied()
    }

    /// Sets the width of a column.
    pub fn set_column_width(&mut self, col: ColNum, width: f64) {
        self.column_widths.insert(col, width);
    }

    /// Every explicit column width.
    pub fn column_widths(&self) -> impl Iterator<Item = (&ColNum, &f64)> {
        self.column_widths.iter()
    }

    /// Height of a row, if set.
    pub fn row_height(&self, row: RowNum) -> Option<f64> {
        self.row_heights.get(&row).copied()
    }

    /// Sets the height of a row.
    pub fn set_row_height(&mut self, row: RowNum, height: f64) {
        self.row_heights.insert(row, height);
    }

    /// Every explicit row height.
    pub fn row_heights(&self) -> impl Iterator<Item = (&RowNum, &f64)> {
        self.row_heights.iter()
    }

    /// The last row holding a cell.
    pub fn last_row(&self) -> Option<RowNum> {
        self.cells.keys().map(|c| c.row).max()
    }

    /// The last column holding a cell.
    pub fn last_col(&self) -> Option<ColNum> {
        self.cells.keys().map(|c| c.col).max()
    }

    /// Print settings.
    pub fn page_setup(&self) -> &PageSetup {
        &self.page_setup
    }

    /// Mutable print settings.
    pub fn page_setup_mut(&mut self) -> &mut PageSetup {
        &mut self.page_setup
    }

    /// Copies the styles and height of row `src` onto row `dest`.
    ///
    /// Values are never copied; the destination cells are left empty.
    pub fn copy_row_styles(&mut self, src: RowNum, dest: RowNum) {
        let styled: Vec<(ColNum, String)> = self
            .cells
            .range(CellRef::new(src, 0)..=CellRef::new(src, ColNum::MAX))
            .filter_map(|(at, cell)| cell.style.clone().map(|s| (at.col, s)))
            .collect();
        for (col, style) in styled {
            self.cells.insert(
                CellRef::new(dest, col),
                Cell {
                    value: CellValue::Empty,
                    style: Some(style),
                },
            );
        }
        if let Some(height) = self.row_height(src) {
            self.set_row_height(dest, height);
        }
    }

    /// Deletes `count` rows starting at `at`, moving the rows below up.
    pub fn delete_rows(&mut self, at: RowNum, count: u32) {
        self.delete(Axis::Row, at, count);
    }

    /// Deletes `count` columns starting at `at`, moving the columns to the
    /// right leftwards.
    pub fn delete_columns(&mut self, at: ColNum, count: u16) {
        self.delete(Axis::Column, u32::from(at), u32::from(count));
    }

    fn delete(&mut self, axis: Axis, at: u32, count: u32) {
        if count == 0 {
            return;
        }
        let end = at + count;

        for (cell_ref, mut cell) in std::mem::take(&mut self.cells) {
            let p = coordinate(axis, cell_ref);
            if p >= at && p < end {
                continue;
            }
            let moved = if p >= end {
                with_coordinate(axis, cell_ref, p - count)
            } else {
                cell_ref
            };
            if let CellValue::Formula(formula) = &cell.value {
                cell.value = CellValue::Formula(shift_formula_references(formula, axis, at, count));
            }
            self.cells.insert(moved, cell);
        }

        self.merges = self
            .merges
            .iter()
            .filter_map(|m| shift_range(axis, m, at, count))
            .filter(|m| !m.is_single_cell())
            .collect();

        match axis {
            Axis::Row => {
                self.row_heights = shift_keys(std::mem::take(&mut self.row_heights), at, count);
            }
            Axis::Column => {
                let widths: BTreeMap<u32, f64> = std::mem::take(&mut self.column_widths)
                    .into_iter()
                    .map(|(c, w)| (u32::from(c), w))
                    .collect();
                self.column_widths = shift_keys(widths, at, count)
                    .into_iter()
                    .filter_map(|(c, w)| ColNum::try_from(c).ok().map(|c| (c, w)))
                    .collect();
            }
        }

        let setup = &mut self.page_setup;
        setup.print_area = setup
            .print_area
            .and_then(|area| shift_range(axis, &area, at, count));
        if axis == Axis::Row {
            setup.repeat_rows = setup
                .repeat_rows
                .and_then(|(first, last)| shift_span(first, last, at, count));
            setup.page_breaks = setup
                .page_breaks
                .iter()
                .filter(|row| **row < at || **row >= end)
                .map(|row| if *row >= end { row - count } else { *row })
                .collect();
        }
    }
}

fn intersects(a: &CellRange, b: &CellRange) -> bool {
    a.first.row <= b.last.row
        && b.first.row <= a.last.row
        && a.first.col <= b.last.col
        && b.first.col <= a.last.col
}

fn coordinate(axis: Axis, at: CellRef) -> u32 {
    match axis {
        Axis::Row => at.row,
        Axis::Column => u32::from(at.col),
    }
}

fn with_coordinate(axis: Axis, at: CellRef, value: u32) -> CellRef {
    match axis {
        Axis::Row => CellRef::new(value, at.col),
        Axis::Column => CellRef::new(at.row, ColNum::try_from(value).unwrap_or(ColNum::MAX)),
    }
}

fn shift_range(axis: Axis, range: &CellRange, at: u32, count: u32) -> Option<CellRange> {
    let (first, last) = shift_span(
        coordinate(axis, range.first),
        coordinate(axis, range.last),
        at,
        count,
    )?;
    Some(CellRange::new(
        with_coordinate(axis, range.first, first),
        with_coordinate(axis, range.last, last),
    ))
}

fn shift_keys<V>(map: BTreeMap<u32, V>, at: u32, count: u32) -> BTreeMap<u32, V> {
    map.into_iter()
        .filter(|(k, _)| *k < at || *k >= at + count)
        .map(|(k, v)| if k >= at + count { (k - count, v) } else { (k, v) })
        .collect()
}
