//! A1 cell references and their adjustment when rows or columns are removed.
//!
//! Formulas in the report refer to other cells by address. When a structural
//! edit deletes rows or columns, every reference is re-anchored the way a
//! spreadsheet application does it: references past the deleted span move
//! back, ranges that straddle it shrink, and references into it become
//! `#REF!`.

use std::fmt;
use std::sync::OnceLock;

use regex::{Captures, Regex};

/// 0-indexed row number.
pub type RowNum = u32;

/// 0-indexed column number.
pub type ColNum = u16;

/// A reference to a single cell. Rows and columns are **0-indexed**.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    /// 0-indexed row.
    pub row: RowNum,
    /// 0-indexed column.
    pub col: ColNum,
}

impl CellRef {
    /// Construct a new [`CellRef`].
    pub const fn new(row: RowNum, col: ColNum) -> Self {
        Self { row, col }
    }

    /// Convert to A1 notation (e.g. `A1`, `AJ12`).
    pub fn to_a1(self) -> String {
        format!("{}{}", column_name(self.col), self.row + 1)
    }

    /// Parse an A1-style reference, accepting `$` markers.
    ///
    /// # Example
    ///
    /// ```
    /// use attendance_report::report::CellRef;
    ///
    /// assert_eq!(CellRef::from_a1("$AJ$12"), Some(CellRef::new(11, 35)));
    /// assert_eq!(CellRef::from_a1("12"), None);
    /// ```
    pub fn from_a1(a1: &str) -> Option<Self> {
        let s = a1.trim().replace('$', "");
        let split = s.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = s.split_at(split);
        if letters.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let col = column_index(letters)?;
        let row: RowNum = digits.parse().ok()?;
        if row == 0 {
            return None;
        }
        Some(Self::new(row - 1, col))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// An inclusive rectangle of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Top-left corner.
    pub first: CellRef,
    /// Bottom-right corner.
    pub last: CellRef,
}

impl CellRange {
    /// Builds a range from two corners, normalizing their order.
    pub fn new(a: CellRef, b: CellRef) -> Self {
        Self {
            first: CellRef::new(a.row.min(b.row), a.col.min(b.col)),
            last: CellRef::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    /// Parses `A1:B2` or a single `A1`.
    pub fn from_a1(a1: &str) -> Option<Self> {
        match a1.split_once(':') {
            Some((a, b)) => Some(Self::new(CellRef::from_a1(a)?, CellRef::from_a1(b)?)),
            None => {
                let cell = CellRef::from_a1(a1)?;
                Some(Self::new(cell, cell))
            }
        }
    }

    /// A1 notation of the range.
    pub fn to_a1(self) -> String {
        format!("{}:{}", self.first.to_a1(), self.last.to_a1())
    }

    /// Returns true when the range covers exactly one cell.
    pub fn is_single_cell(&self) -> bool {
        self.first == self.last
    }

    /// Returns true if `cell` lies within this range.
    pub fn contains(&self, cell: CellRef) -> bool {
        cell.row >= self.first.row
            && cell.row <= self.last.row
            && cell.col >= self.first.col
            && cell.col <= self.last.col
    }

    /// Every cell of the range, row by row.
    pub fn cells(&self) -> impl Iterator<Item = CellRef> + '_ {
        (self.first.row..=self.last.row)
            .flat_map(move |row| (self.first.col..=self.last.col).map(move |col| CellRef::new(row, col)))
    }
}

/// Which dimension a structural edit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Rows are removed.
    Row,
    /// Columns are removed.
    Column,
}

/// Column letters for a 0-indexed column (0 → `A`, 35 → `AJ`).
pub fn column_name(col: ColNum) -> String {
    let mut n = u32::from(col) + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        out.push(char::from(b'A' + rem));
        n = (n - 1) / 26;
    }
    out.iter().rev().collect()
}

/// 0-indexed column for column letters, case-insensitive.
pub fn column_index(letters: &str) -> Option<ColNum> {
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }
    let mut col: u32 = 0;
    for b in letters.bytes() {
        if !b.is_ascii_alphabetic() {
            return None;
        }
        col = col * 26 + u32::from(b.to_ascii_uppercase() - b'A') + 1;
    }
    ColNum::try_from(col - 1).ok()
}

/// Adjusts the inclusive span `[first, last]` for the removal of `count`
/// positions starting at `at`.
///
/// Returns `None` when the whole span is removed.
pub fn shift_span(first: u32, last: u32, at: u32, count: u32) -> Option<(u32, u32)> {
    let end = at + count;
    let new_first = if first >= end {
        first - count
    } else if first >= at {
        at
    } else {
        first
    };
    let new_last = if last >= end {
        last - count
    } else if last >= at {
        // Nothing before the removed span is left in the range.
        if at == 0 || at <= first {
            return None;
        }
        at - 1
    } else {
        last
    };
    (new_first <= new_last).then_some((new_first, new_last))
}

fn reference_regex() -> &'static Regex {
    static REFERENCE_RE: OnceLock<Regex> = OnceLock::new();
    REFERENCE_RE.get_or_init(|| {
        Regex::new(r"(\$?)([A-Za-z]{1,3})(\$?)(\d+)(?::(\$?)([A-Za-z]{1,3})(\$?)(\d+))?")
            .expect("valid regex")
    })
}

/// One endpoint of a reference as written, keeping its `$` markers.
struct Endpoint<'a> {
    col_abs: &'a str,
    col: ColNum,
    row_abs: &'a str,
    row: RowNum,
}

impl Endpoint<'_> {
    fn render(&self) -> String {
        format!(
            "{}{}{}{}",
            self.col_abs,
            column_name(self.col),
            self.row_abs,
            self.row + 1
        )
    }
}

fn endpoint<'a>(caps: &Captures<'a>, base: usize) -> Option<Endpoint<'a>> {
    let col = column_index(caps.get(base + 1)?.as_str())?;
    let row: RowNum = caps.get(base + 3)?.as_str().parse().ok()?;
    if row == 0 {
        return None;
    }
    Some(Endpoint {
        col_abs: caps.get(base)?.as_str(),
        col,
        row_abs: caps.get(base + 2)?.as_str(),
        row: row - 1,
    })
}

/// Rewrites the references in `formula` after `count` rows or columns were
/// removed starting at `at`.
///
/// # Example
///
/// ```
/// use attendance_report::report::{shift_formula_references, Axis};
///
/// // Rows 7..=12 (0-indexed 6..=11) are deleted
/// let shifted = shift_formula_references("=SUM(E13:E15)-E7", Axis::Row, 6, 6);
/// assert_eq!(shifted, "=SUM(E7:E9)-#REF!");
/// ```
pub fn shift_formula_references(formula: &str, axis: Axis, at: u32, count: u32) -> String {
    let bytes = formula.as_bytes();
    let mut out = String::with_capacity(formula.len());
    let mut last_end = 0;

    for caps in reference_regex().captures_iter(formula) {
        let Some(whole) = caps.get(0) else { continue };

        // Part of a longer identifier, or a function name such as LOG10(.
        let preceded = whole.start() > 0 && {
            let b = bytes[whole.start() - 1];
            b.is_ascii_alphanumeric() || b == b'_' || b == b'.'
        };
        let followed = bytes
            .get(whole.end())
            .is_some_and(|b| *b == b'(' || b.is_ascii_alphanumeric() || *b == b'_');
        if preceded || followed {
            continue;
        }

        let Some(first) = endpoint(&caps, 1) else { continue };
        let second = endpoint(&caps, 5);

        out.push_str(&formula[last_end..whole.start()]);
        last_end = whole.end();

        let coordinate = |e: &Endpoint<'_>| match axis {
            Axis::Row => e.row,
            Axis::Column => u32::from(e.col),
        };

        let (mut a, mut b) = (first, second);

        let span = match &b {
            Some(b) => shift_span(coordinate(&a), coordinate(b), at, count),
            None => {
                let p = coordinate(&a);
                if p >= at && p < at + count {
                    None
                } else if p >= at + count {
                    Some((p - count, p - count))
                } else {
                    Some((p, p))
                }
            }
        };

        let Some((new_first, new_last)) = span else {
            out.push_str("#REF!");
            continue;
        };

        let apply = |e: &mut Endpoint<'_>, value: u32| match axis {
            Axis::Row => e.row = value,
            Axis::Column => e.col = ColNum::try_from(value).unwrap_or(ColNum::MAX),
        };
        apply(&mut a, new_first);
        out.push_str(&a.render());
        if let Some(b) = b.as_mut() {
            apply(b, new_last);
            out.push(':');
            out.push_str(&b.render());
        }
    }

    out.push_str(&formula[last_end..]);
    out
}
