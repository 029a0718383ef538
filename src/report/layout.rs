//! Row and column planning for the report.
//!
//! Every coordinate the builder writes to is derived here from the template
//! anchors, the period length, the number of projects and the number of
//! employees. Keeping the arithmetic in one place lets the layout rules be
//! tested without touching a worksheet.

use crate::error::{ReportError, ReportResult};

use super::references::{ColNum, RowNum};
use super::template::{TEMPLATE_BLOCK_ROWS, TemplateAnchors};

/// Rows per employee block besides the project rows: start, closing, break,
/// day total and W.T. total.
pub const FIXED_BLOCK_ROWS: u32 = 5;

/// Blank rows between the attendance grid and the summary section.
pub const SUMMARY_GAP_ROWS: u32 = 3;

/// A row of an employee block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRow {
    /// Normalized start times.
    Start,
    /// Normalized end times.
    Closing,
    /// Lunch break durations.
    Break,
    /// Worked time per day.
    DayTotal,
    /// Hours attributed to the project at this index.
    Project(u32),
    /// Sum of the project rows.
    WorkingTimeTotal,
}

impl BlockRow {
    /// Offset of this row within a block holding `project_count` project rows.
    pub fn offset(self, project_count: u32) -> u32 {
        match self {
            BlockRow::Start => 0,
            BlockRow::Closing => 1,
            BlockRow::Break => 2,
            BlockRow::DayTotal => 3,
            BlockRow::Project(index) => 4 + index,
            BlockRow::WorkingTimeTotal => 4 + project_count,
        }
    }

    /// Offset of the template row this row copies its styles from.
    pub fn template_offset(self) -> u32 {
        match self {
            BlockRow::Project(_) => 4,
            BlockRow::WorkingTimeTotal => TEMPLATE_BLOCK_ROWS - 1,
            other => other.offset(0),
        }
    }
}

/// The signature block position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureLayout {
    /// Row of the signature captions.
    pub row: RowNum,
    /// Column of the "prepared by" caption.
    pub prepared_by_col: ColNum,
    /// Column of the "approved by" caption.
    pub approved_by_col: ColNum,
}

/// Coordinates of every region of the finished report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLayout {
    /// Days in the period (D).
    pub day_count: u16,
    /// Projects in the snapshot (P).
    pub project_count: u32,
    /// Employee blocks.
    pub employee_count: u32,
    /// First date column.
    pub first_date_col: ColNum,
    /// Date columns the template lays out.
    pub template_date_columns: u16,
    /// First row of the template block, and of the grid once it is gone.
    pub block_start: RowNum,
    /// Header rows repeated on each printed page.
    pub header_rows: (RowNum, RowNum),
}

impl ReportLayout {
    /// Plans the report.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidPeriod`] when the period has more days
    /// than the template has date columns, or no days at all.
    ///
    /// # Example
    ///
    /// ```
    /// use attendance_report::report::{BlockRow, ReportLayout, TemplateAnchors, CellRef};
    ///
    /// let anchors = TemplateAnchors {
    ///     period_start: CellRef::new(1, 2),
    ///     business_days: CellRef::new(2, 2),
    ///     caption: CellRef::new(3, 4),
    ///     date_labels: CellRef::new(4, 4),
    ///     weekday_labels: CellRef::new(5, 4),
    ///     date_columns: 31,
    ///     header_rows: (3, 5),
    ///     block_start: 6,
    /// };
    /// let layout = ReportLayout::plan(&anchors, 28, 2, 3).unwrap();
    ///
    /// assert_eq!(layout.block_rows(), 7);
    /// assert_eq!(layout.last_date_col(), 31);
    /// assert_eq!(layout.row(1, BlockRow::Start), 13);
    /// ```
    pub fn plan(
        anchors: &TemplateAnchors,
        day_count: u32,
        project_count: u32,
        employee_count: u32,
    ) -> ReportResult<Self> {
        let max_days = u32::from(anchors.date_columns);
        if day_count == 0 || day_count > max_days {
            return Err(ReportError::InvalidPeriod {
                message: format!(
                    "period covers {} days, the template supports 1 to {}",
                    day_count, max_days
                ),
            });
        }

        Ok(Self {
            day_count: day_count as u16,
            project_count,
            employee_count,
            first_date_col: anchors.first_date_col(),
            template_date_columns: anchors.date_columns,
            block_start: anchors.block_start,
            header_rows: anchors.header_rows,
        })
    }

    /// Rows in one employee block: 5 + P.
    pub fn block_rows(&self) -> u32 {
        FIXED_BLOCK_ROWS + self.project_count
    }

    /// The rows of one block, top to bottom.
    pub fn block_row_kinds(&self) -> Vec<BlockRow> {
        let mut rows = vec![
            BlockRow::Start,
            BlockRow::Closing,
            BlockRow::Break,
            BlockRow::DayTotal,
        ];
        rows.extend((0..self.project_count).map(BlockRow::Project));
        rows.push(BlockRow::WorkingTimeTotal);
        rows
    }

    /// Trailing template date columns that must be removed.
    pub fn unused_date_columns(&self) -> u16 {
        self.template_date_columns - self.day_count
    }

    /// First column past the period, where trimming starts.
    pub fn first_unused_date_col(&self) -> ColNum {
        self.first_date_col + self.day_count
    }

    /// Column of the day at `index` (0-based).
    pub fn date_col(&self, index: u16) -> ColNum {
        self.first_date_col + index
    }

    /// Last date column after trimming.
    pub fn last_date_col(&self) -> ColNum {
        self.first_date_col + self.day_count - 1
    }

    /// Row-total column after trimming.
    pub fn total_col(&self) -> ColNum {
        self.last_date_col() + 1
    }

    /// First row of block `employee` while the template block is still present.
    pub fn staged_block_first_row(&self, employee: u32) -> RowNum {
        self.block_start + TEMPLATE_BLOCK_ROWS + employee * self.block_rows()
    }

    /// First row of block `employee` in the finished report.
    pub fn block_first_row(&self, employee: u32) -> RowNum {
        self.block_start + employee * self.block_rows()
    }

    /// A row of block `employee` in the finished report.
    pub fn row(&self, employee: u32, which: BlockRow) -> RowNum {
        self.block_first_row(employee) + which.offset(self.project_count)
    }

    /// A row of block `employee` while the template block is still present.
    pub fn staged_row(&self, employee: u32, which: BlockRow) -> RowNum {
        self.staged_block_first_row(employee) + which.offset(self.project_count)
    }

    /// A row of the template block.
    pub fn template_row(&self, which: BlockRow) -> RowNum {
        self.block_start + which.template_offset()
    }

    /// Rows the grid occupies: employees × (5 + P).
    pub fn grid_row_count(&self) -> u32 {
        self.employee_count * self.block_rows()
    }

    /// First row past the grid.
    pub fn grid_end_row(&self) -> RowNum {
        self.block_start + self.grid_row_count()
    }

    /// First row of the summary section.
    pub fn summary_first_row(&self) -> RowNum {
        self.grid_end_row() + SUMMARY_GAP_ROWS
    }

    /// Summary row holding the total for project `index`.
    pub fn summary_project_row(&self, index: u32) -> RowNum {
        self.summary_first_row() + 1 + index
    }

    /// Summary row holding the grand total.
    pub fn summary_total_row(&self) -> RowNum {
        self.summary_project_row(self.project_count)
    }

    /// Summary row holding the occupancy ratio.
    pub fn summary_occupancy_row(&self) -> RowNum {
        self.summary_total_row() + 1
    }

    /// Where the signature block goes; columns follow the last date column.
    pub fn signature(&self) -> SignatureLayout {
        SignatureLayout {
            row: self.summary_first_row(),
            prepared_by_col: self.last_date_col() - self.day_count / 2,
            approved_by_col: self.total_col(),
        }
    }
}
