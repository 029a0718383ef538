//! Report synthesis.
//!
//! [`ReportBuilder`] turns a [`Template`] and an [`ExportContext`] into the
//! finished worksheet. The work is split into [`Phase`]s that always run in
//! the same order, since each phase relies on the cells earlier phases left
//! in their final position:
//!
//! 1. trim the date columns the period does not use
//! 2. write the header cells and mark weekend columns
//! 3. place one block per employee below the template block
//! 4. remove the template block
//! 5. merge identity cells and add the total formulas
//! 6. add the project summary and signature block
//! 7. configure printing
//!
//! Loading the template happens before the builder exists, and persisting
//! the result happens after it is done (see [`crate::report::write_report`]).

use tracing::debug;

use crate::calculation::{
    date_label, excel_serial_date, excel_time_fraction, is_weekend, lunch_break_within,
    minutes_to_day_fraction, parse_time_to_minutes, weekday_label,
};
use crate::error::ReportResult;
use crate::models::{
    AttendanceRecord, EmployeeId, Project, ProjectAssignments, ReportPeriod,
};

use super::layout::{BlockRow, ReportLayout};
use super::references::{CellRange, CellRef, ColNum, RowNum, column_name};
use super::sheet::Sheet;
use super::template::{TEMPLATE_BLOCK_ROWS, Template, TemplateAnchors, styles};

/// Bilingual labels written by the builder.
mod labels {
    pub const START: &str = "Giờ vào / Start";
    pub const CLOSING: &str = "Giờ ra / Closing";
    pub const BREAK: &str = "Nghỉ trưa / Break";
    pub const DAY_TOTAL: &str = "Tổng ngày / Day total";
    pub const WORKING_TIME: &str = "Thời gian làm việc / Working Time";
    pub const WT_TOTAL: &str = "W.T. total";
    pub const NO_PROJECT: &str = "Chưa có dự án / No project";
    pub const SUMMARY_PROJECT: &str = "Dự án / Project";
    pub const SUMMARY_HOURS: &str = "Tổng giờ / Total hours";
    pub const GRAND_TOTAL: &str = "Tổng cộng / Grand total";
    pub const OCCUPANCY: &str = "Tỷ lệ lấp đầy / Occupancy";
    pub const PREPARED_BY: &str = "Người lập / Prepared by";
    pub const APPROVED_BY: &str = "Người duyệt / Approved by";
    pub const SIGNATURE_NOTE: &str = "(Ký, ghi rõ họ tên / Signature, full name)";
}

/// Spreadsheet functions accept at most this many arguments.
const MAX_FUNCTION_ARGS: usize = 255;

/// Hours in a standard working day, used by the occupancy ratio.
const STANDARD_DAY_HOURS: u32 = 8;

/// Column of the summary labels (B); the label spans B:C.
const SUMMARY_LABEL_COL: ColNum = 1;

/// Column of the summary values (D).
const SUMMARY_VALUE_COL: ColNum = 3;

/// Identity and row-label columns of an employee block.
const INDEX_COL: ColNum = 0;
const IDENTITY_COL: ColNum = 1;
const LABEL_COL: ColNum = 2;
const SUB_LABEL_COL: ColNum = 3;

/// Everything one export works from.
///
/// The context is built once per request and read by every phase.
#[derive(Debug, Clone)]
pub struct ExportContext {
    /// The reporting period.
    pub period: ReportPeriod,
    /// Aggregated records with display times filled in, in report order.
    pub records: Vec<AttendanceRecord>,
    /// Project snapshot, in summary order.
    pub projects: Vec<Project>,
    /// Employee-to-project attribution derived from the snapshot.
    pub assignments: ProjectAssignments,
}

impl ExportContext {
    /// Builds a context, deriving project assignments from the snapshot.
    pub fn new(period: ReportPeriod, records: Vec<AttendanceRecord>, projects: Vec<Project>) -> Self {
        let assignments = ProjectAssignments::from_projects(&projects);
        Self {
            period,
            records,
            projects,
            assignments,
        }
    }

    /// Index in [`Self::projects`] of the project an employee is attributed to.
    pub fn assigned_project_index(&self, employee_id: EmployeeId) -> Option<u32> {
        let project_id = self.assignments.project_of(employee_id)?;
        self.projects
            .iter()
            .position(|p| p.id == project_id)
            .map(|index| index as u32)
    }
}

/// The synthesis phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Delete the date columns past the end of the period.
    TrimDateColumns,
    /// Period start, business days, date and weekday labels, weekend fill.
    WriteHeader,
    /// One populated block per employee.
    PlaceBlocks,
    /// Delete the template block.
    RemoveTemplateBlock,
    /// Identity merges, row totals and W.T. totals.
    InjectTotals,
    /// Project summary and signature block.
    BuildSummary,
    /// Orientation, scaling, print area, repeated rows and page breaks.
    ConfigurePage,
}

impl Phase {
    /// Every phase in execution order.
    pub const ALL: [Phase; 7] = [
        Phase::TrimDateColumns,
        Phase::WriteHeader,
        Phase::PlaceBlocks,
        Phase::RemoveTemplateBlock,
        Phase::InjectTotals,
        Phase::BuildSummary,
        Phase::ConfigurePage,
    ];
}

/// Builds the report worksheet phase by phase.
///
/// # Example
///
/// ```no_run
/// use attendance_report::models::ReportPeriod;
/// use attendance_report::report::{ExportContext, ReportBuilder, Template};
/// use chrono::NaiveDate;
///
/// let template = Template::load("./config/templates/attendance.yaml")?;
/// let period = ReportPeriod::new(
///     NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
/// )?;
/// let context = ExportContext::new(period, vec![], vec![]);
///
/// let sheet = ReportBuilder::new(template, &context)?.build()?;
/// assert_eq!(sheet.name(), "Cham cong");
/// # Ok::<(), attendance_report::error::ReportError>(())
/// ```
#[derive(Debug)]
pub struct ReportBuilder<'a> {
    sheet: Sheet,
    anchors: TemplateAnchors,
    layout: ReportLayout,
    context: &'a ExportContext,
    completed: Option<Phase>,
}

impl<'a> ReportBuilder<'a> {
    /// Plans the layout for `context` on top of a loaded template.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ReportError::InvalidPeriod`] when the period
    /// does not fit the template's date columns.
    pub fn new(template: Template, context: &'a ExportContext) -> ReportResult<Self> {
        let layout = ReportLayout::plan(
            &template.anchors,
            context.period.day_count(),
            context.projects.len() as u32,
            context.records.len() as u32,
        )?;
        Ok(Self {
            sheet: template.sheet,
            anchors: template.anchors,
            layout,
            context,
            completed: None,
        })
    }

    /// The planned layout.
    pub fn layout(&self) -> &ReportLayout {
        &self.layout
    }

    /// The worksheet in its current state.
    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    /// The last phase that ran.
    pub fn completed(&self) -> Option<Phase> {
        self.completed
    }

    /// Runs every pending phase up to and including `target`.
    ///
    /// Phases that already ran are skipped, so calling this with an earlier
    /// phase is a no-op.
    pub fn run_until(&mut self, target: Phase) -> ReportResult<()> {
        for phase in Phase::ALL {
            if phase > target {
                break;
            }
            if self.completed.is_some_and(|done| phase <= done) {
                continue;
            }
            debug!(phase = ?phase, "Running report phase");
            self.run(phase)?;
            self.completed = Some(phase);
        }
        Ok(())
    }

    /// Runs all phases and returns the finished worksheet.
    pub fn build(mut self) -> ReportResult<Sheet> {
        self.run_until(Phase::ConfigurePage)?;
        Ok(self.sheet)
    }

    fn run(&mut self, phase: Phase) -> ReportResult<()> {
        match phase {
            Phase::TrimDateColumns => self.trim_date_columns(),
            Phase::WriteHeader => self.write_header(),
            Phase::PlaceBlocks => self.place_blocks()?,
            Phase::RemoveTemplateBlock => self.remove_template_block(),
            Phase::InjectTotals => self.inject_totals(),
            Phase::BuildSummary => self.build_summary(),
            Phase::ConfigurePage => self.configure_page(),
        }
        Ok(())
    }

    fn trim_date_columns(&mut self) {
        let unused = self.layout.unused_date_columns();
        if unused > 0 {
            self.sheet
                .delete_columns(self.layout.first_unused_date_col(), unused);
        }
    }

    fn write_header(&mut self) {
        let period = &self.context.period;
        let business_days = period.business_day_count();

        self.sheet.set_number(
            self.anchors.period_start,
            excel_serial_date(period.start_date),
        );
        self.sheet
            .set_number(self.anchors.business_days, f64::from(business_days));
        self.sheet.set_text(
            self.anchors.caption,
            format!(
                "{} - {} ({} ngày làm việc / {} business days)",
                period.start_date.format("%d/%m/%Y"),
                period.end_date.format("%d/%m/%Y"),
                business_days,
                business_days
            ),
        );

        let template_rows = self.layout.block_start..self.layout.block_start + TEMPLATE_BLOCK_ROWS;
        for (index, date) in period.dates().into_iter().enumerate() {
            let col = self.layout.date_col(index as u16);
            let date_cell = CellRef::new(self.anchors.date_labels.row, col);
            let weekday_cell = CellRef::new(self.anchors.weekday_labels.row, col);
            self.sheet.set_text(date_cell, date_label(date));
            self.sheet.set_text(weekday_cell, weekday_label(date));

            if is_weekend(date) {
                self.sheet.layer_style(date_cell, styles::WEEKEND);
                self.sheet.layer_style(weekday_cell, styles::WEEKEND);
                // Blocks copy these styles when they are placed.
                for row in template_rows.clone() {
                    self.sheet.layer_style(CellRef::new(row, col), styles::WEEKEND);
                }
            }
        }
    }

    fn place_blocks(&mut self) -> ReportResult<()> {
        let context = self.context;
        for (index, record) in context.records.iter().enumerate() {
            let employee = index as u32;
            self.clone_template_block(employee);
            self.write_identity(employee, record);
            self.write_row_labels(employee);
            self.write_days(employee, record)?;
        }
        debug!(blocks = context.records.len(), "Placed employee blocks");
        Ok(())
    }

    fn clone_template_block(&mut self, employee: u32) {
        for which in self.layout.block_row_kinds() {
            self.sheet.copy_row_styles(
                self.layout.template_row(which),
                self.layout.staged_row(employee, which),
            );
        }
    }

    fn write_identity(&mut self, employee: u32, record: &AttendanceRecord) {
        let row = self.layout.staged_block_first_row(employee);
        let project = self
            .context
            .assigned_project_index(record.employee.id)
            .and_then(|index| self.context.projects.get(index as usize))
            .map(|p| p.name.as_str())
            .unwrap_or(labels::NO_PROJECT);

        let mut identity = record.employee.name.clone();
        if !record.employee.username.is_empty() {
            identity.push_str(&format!("\n@{}", record.employee.username));
        }
        identity.push('\n');
        identity.push_str(project);

        self.sheet
            .set_number(CellRef::new(row, INDEX_COL), f64::from(employee + 1));
        self.sheet.set_text(CellRef::new(row, IDENTITY_COL), identity);
    }

    fn write_row_labels(&mut self, employee: u32) {
        let layout = &self.layout;
        let label = |which| CellRef::new(layout.staged_row(employee, which), LABEL_COL);

        let mut cells = vec![
            (label(BlockRow::Start), labels::START.to_string()),
            (label(BlockRow::Closing), labels::CLOSING.to_string()),
            (label(BlockRow::Break), labels::BREAK.to_string()),
            (label(BlockRow::DayTotal), labels::DAY_TOTAL.to_string()),
            (label(BlockRow::WorkingTimeTotal), labels::WT_TOTAL.to_string()),
        ];
        if !self.context.projects.is_empty() {
            cells.push((label(BlockRow::Project(0)), labels::WORKING_TIME.to_string()));
        }
        for (index, project) in self.context.projects.iter().enumerate() {
            let row = layout.staged_row(employee, BlockRow::Project(index as u32));
            cells.push((CellRef::new(row, SUB_LABEL_COL), project.name.clone()));
        }

        for (cell, text) in cells {
            self.sheet.set_text(cell, text);
        }
    }

    fn write_days(&mut self, employee: u32, record: &AttendanceRecord) -> ReportResult<()> {
        let layout = self.layout.clone();
        let policy = record.employee.shift_policy;
        let assigned = self.context.assigned_project_index(record.employee.id);

        for (index, date) in self.context.period.dates().into_iter().enumerate() {
            let col = layout.date_col(index as u16);
            let at = |which| CellRef::new(layout.staged_row(employee, which), col);
            let (start, end, lunch, total) = (
                at(BlockRow::Start),
                at(BlockRow::Closing),
                at(BlockRow::Break),
                at(BlockRow::DayTotal),
            );

            if let Some(day) = record.day(date) {
                if let (Some(shown_start), Some(shown_end)) =
                    (day.display_start.as_deref(), day.display_end.as_deref())
                {
                    self.sheet.set_number(start, excel_time_fraction(shown_start)?);
                    self.sheet.set_number(end, excel_time_fraction(shown_end)?);
                    let break_minutes = lunch_break_within(
                        parse_time_to_minutes(shown_start)?,
                        parse_time_to_minutes(shown_end)?,
                        policy,
                    );
                    self.sheet
                        .set_number(lunch, minutes_to_day_fraction(break_minutes));
                }
                if !day.tickets.is_empty() {
                    self.sheet.layer_style(start, styles::TICKET);
                }
                if day.is_approved_leave() {
                    self.sheet.layer_style(start, styles::LEAVE);
                }
            }

            self.sheet.set_formula(
                total,
                format!(
                    "=IF(COUNT({s}:{e})<2,0,MAX(0,{e}-{s}-{b}))",
                    s = start.to_a1(),
                    e = end.to_a1(),
                    b = lunch.to_a1()
                ),
            );

            for project in 0..layout.project_count {
                let cell = at(BlockRow::Project(project));
                if assigned == Some(project) {
                    self.sheet.set_formula(cell, format!("={}", total.to_a1()));
                } else {
                    self.sheet.set_number(cell, 0.0);
                }
            }
        }

        if let Some(project) = assigned {
            let row = layout.staged_row(employee, BlockRow::Project(project));
            for col in SUB_LABEL_COL..=layout.total_col() {
                self.sheet.layer_style(CellRef::new(row, col), styles::ASSIGNED);
            }
        }
        Ok(())
    }

    fn remove_template_block(&mut self) {
        self.sheet
            .delete_rows(self.layout.block_start, TEMPLATE_BLOCK_ROWS);
    }

    fn inject_totals(&mut self) {
        let layout = self.layout.clone();
        let first_col = layout.first_date_col;
        let last_col = layout.last_date_col();
        let total_col = layout.total_col();

        for employee in 0..layout.employee_count {
            let first_row = layout.block_first_row(employee);
            let last_row = first_row + layout.block_rows() - 1;
            for col in [INDEX_COL, IDENTITY_COL] {
                self.sheet.merge(CellRange::new(
                    CellRef::new(first_row, col),
                    CellRef::new(last_row, col),
                ));
            }

            for which in [
                BlockRow::Start,
                BlockRow::Closing,
                BlockRow::Break,
                BlockRow::DayTotal,
                BlockRow::WorkingTimeTotal,
            ] {
                let row = layout.row(employee, which);
                self.sheet.merge(CellRange::new(
                    CellRef::new(row, LABEL_COL),
                    CellRef::new(row, SUB_LABEL_COL),
                ));
            }

            if layout.project_count > 0 {
                let first_project = layout.row(employee, BlockRow::Project(0));
                let last_project = layout.row(employee, BlockRow::Project(layout.project_count - 1));
                self.sheet.merge(CellRange::new(
                    CellRef::new(first_project, LABEL_COL),
                    CellRef::new(last_project, LABEL_COL),
                ));

                for col in first_col..=last_col {
                    self.sheet.set_formula(
                        CellRef::new(layout.row(employee, BlockRow::WorkingTimeTotal), col),
                        format!(
                            "=SUM({}:{})",
                            CellRef::new(first_project, col).to_a1(),
                            CellRef::new(last_project, col).to_a1()
                        ),
                    );
                }
            } else {
                for col in first_col..=last_col {
                    self.sheet.set_number(
                        CellRef::new(layout.row(employee, BlockRow::WorkingTimeTotal), col),
                        0.0,
                    );
                }
            }

            // Clock-time rows get no row total; a sum of times of day is meaningless.
            for which in layout.block_row_kinds() {
                if matches!(which, BlockRow::Start | BlockRow::Closing) {
                    continue;
                }
                let row = layout.row(employee, which);
                self.sheet.set_formula(
                    CellRef::new(row, total_col),
                    sum_row_formula(row, first_col, last_col),
                );
            }
        }
    }

    fn build_summary(&mut self) {
        let layout = self.layout.clone();
        let total_col = layout.total_col();
        let header_row = layout.summary_first_row();

        self.summary_row(header_row, labels::SUMMARY_PROJECT, styles::SUMMARY_HEADER);
        let hours_cell = CellRef::new(header_row, SUMMARY_VALUE_COL);
        self.sheet.set_text(hours_cell, labels::SUMMARY_HOURS);
        self.sheet.set_style(hours_cell, styles::SUMMARY_HEADER);

        for (index, project) in self.context.projects.iter().enumerate() {
            let index = index as u32;
            let row = layout.summary_project_row(index);
            self.summary_row(row, &project.name, styles::SUMMARY_LABEL);

            let refs: Vec<String> = (0..layout.employee_count)
                .map(|employee| {
                    CellRef::new(layout.row(employee, BlockRow::Project(index)), total_col).to_a1()
                })
                .collect();
            let cell = CellRef::new(row, SUMMARY_VALUE_COL);
            match sum_formula(&refs) {
                Some(formula) => self.sheet.set_formula(cell, formula),
                None => self.sheet.set_number(cell, 0.0),
            }
            self.sheet.set_style(cell, styles::SUMMARY_VALUE);
        }

        let total_row = layout.summary_total_row();
        self.summary_row(total_row, labels::GRAND_TOTAL, styles::SUMMARY_HEADER);
        let grand_total = CellRef::new(total_row, SUMMARY_VALUE_COL);
        if layout.project_count > 0 {
            self.sheet.set_formula(
                grand_total,
                format!(
                    "=SUM({}:{})",
                    CellRef::new(layout.summary_project_row(0), SUMMARY_VALUE_COL).to_a1(),
                    CellRef::new(
                        layout.summary_project_row(layout.project_count - 1),
                        SUMMARY_VALUE_COL
                    )
                    .to_a1()
                ),
            );
        } else {
            self.sheet.set_number(grand_total, 0.0);
        }
        self.sheet.set_style(grand_total, styles::SUMMARY_VALUE);

        let occupancy_row = layout.summary_occupancy_row();
        self.summary_row(occupancy_row, labels::OCCUPANCY, styles::SUMMARY_HEADER);
        let occupancy = CellRef::new(occupancy_row, SUMMARY_VALUE_COL);
        self.sheet.set_formula(
            occupancy,
            format!(
                "=IFERROR({}*24/({}*{}*{}),0)",
                grand_total.to_a1(),
                STANDARD_DAY_HOURS,
                absolute(self.anchors.business_days),
                layout.employee_count
            ),
        );
        self.sheet.set_style(occupancy, styles::PERCENT);

        let signature = layout.signature();
        for (col, caption) in [
            (signature.prepared_by_col, labels::PREPARED_BY),
            (signature.approved_by_col, labels::APPROVED_BY),
        ] {
            let caption_cell = CellRef::new(signature.row, col);
            let note_cell = CellRef::new(signature.row + 1, col);
            self.sheet.set_text(caption_cell, caption);
            self.sheet.set_style(caption_cell, styles::SIGNATURE);
            self.sheet.set_text(note_cell, labels::SIGNATURE_NOTE);
            self.sheet.set_style(note_cell, styles::SIGNATURE_NOTE);
        }
    }

    /// Writes a summary label spanning the label columns.
    fn summary_row(&mut self, row: RowNum, text: &str, style: &str) {
        let label = CellRef::new(row, SUMMARY_LABEL_COL);
        let spill = CellRef::new(row, SUMMARY_VALUE_COL - 1);
        self.sheet.set_text(label, text);
        self.sheet.set_style(label, style);
        self.sheet.set_style(spill, style);
        self.sheet.merge(CellRange::new(label, spill));
    }

    fn configure_page(&mut self) {
        let layout = &self.layout;
        let setup = self.sheet.page_setup_mut();
        setup.landscape = true;
        setup.fit_to_width = true;
        setup.print_area = Some(CellRange::new(
            CellRef::new(0, 0),
            CellRef::new(layout.grid_end_row() - 1, layout.total_col()),
        ));
        setup.repeat_rows = Some(layout.header_rows);
        setup.page_breaks = vec![layout.summary_first_row()];
    }
}

fn absolute(cell: CellRef) -> String {
    format!("${}${}", column_name(cell.col), cell.row + 1)
}

fn sum_row_formula(row: RowNum, first_col: ColNum, last_col: ColNum) -> String {
    format!(
        "=SUM({}:{})",
        CellRef::new(row, first_col).to_a1(),
        CellRef::new(row, last_col).to_a1()
    )
}

/// `=SUM(a,b,...)`, split into several SUMs when there are more references
/// than a function accepts. `None` when there is nothing to sum.
fn sum_formula(refs: &[String]) -> Option<String> {
    if refs.is_empty() {
        return None;
    }
    let parts: Vec<String> = refs
        .chunks(MAX_FUNCTION_ARGS)
        .map(|chunk| format!("SUM({})", chunk.join(",")))
        .collect();
    Some(format!("={}", parts.join("+")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::format_attendance_times;
    use crate::error::ReportError;
    use crate::models::{
        ApprovalState, DayEntry, Employee, LeaveTicket, ShiftPolicy, TicketType,
    };
    use crate::report::sheet::CellValue;
    use chrono::NaiveDate;

    const TEMPLATE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config/templates/attendance.yaml");

    fn make_date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn a1(s: &str) -> CellRef {
        CellRef::from_a1(s).unwrap()
    }

    fn day(date: &str, start: &str, worked_minutes: u32) -> DayEntry {
        DayEntry {
            date: make_date(date),
            start_time: Some(start.to_string()),
            end_time: None,
            worked_minutes,
            display_start: None,
            display_end: None,
            tickets: vec![],
        }
    }

    fn record(id: EmployeeId, days: Vec<DayEntry>) -> AttendanceRecord {
        AttendanceRecord {
            employee: Employee {
                id,
                name: format!("Employee {}", id),
                username: format!("emp{}", id),
                shift_policy: ShiftPolicy::Standard,
            },
            days,
        }
    }

    fn projects() -> Vec<Project> {
        vec![
            Project {
                id: 10,
                name: "Alpha".to_string(),
                employee_ids: vec![2],
            },
            Project {
                id: 20,
                name: "Beta".to_string(),
                employee_ids: vec![1],
            },
        ]
    }

    /// 2025-03-01 (Saturday) to 2025-03-07, two employees, two projects.
    fn week_context() -> ExportContext {
        let mut monday = day("2025-03-03", "08:00", 480);
        monday.tickets.push(LeaveTicket {
            employee_id: 1,
            date: make_date("2025-03-03"),
            ticket_type: TicketType::Leave,
            approval_state: ApprovalState::Approved,
            note: None,
            deleted: false,
        });
        let records = format_attendance_times(&[
            record(1, vec![monday, day("2025-03-04", "08:00", 225)]),
            record(2, vec![]),
        ])
        .unwrap();
        let period = ReportPeriod::new(make_date("2025-03-01"), make_date("2025-03-07")).unwrap();
        ExportContext::new(period, records, projects())
    }

    fn builder(context: &ExportContext) -> ReportBuilder<'_> {
        ReportBuilder::new(Template::load(TEMPLATE).unwrap(), context).unwrap()
    }

    #[test]
    fn test_trim_date_columns_moves_total_column() {
        let context = week_context();
        let mut builder = builder(&context);
        builder.run_until(Phase::TrimDateColumns).unwrap();

        let sheet = builder.sheet();
        // 7 days: E..K are dates, L holds the totals
        assert_eq!(sheet.value(a1("L4")).as_text(), Some("Tổng / Total"));
        assert!(sheet.merges().contains(&CellRange::from_a1("A1:L1").unwrap()));
        assert!(sheet.merges().contains(&CellRange::from_a1("E4:K4").unwrap()));
        assert_eq!(sheet.style_name(a1("L12")), Some("wt_total"));
        assert_eq!(sheet.style_name(a1("M12")), None);
    }

    #[test]
    fn test_header_cells_and_weekend_fill() {
        let context = week_context();
        let mut builder = builder(&context);
        builder.run_until(Phase::WriteHeader).unwrap();

        let sheet = builder.sheet();
        assert_eq!(sheet.value(a1("C2")).as_number(), Some(45717.0));
        assert_eq!(sheet.value(a1("C3")).as_number(), Some(5.0));
        assert_eq!(sheet.value(a1("E5")).as_text(), Some("01/03"));
        assert_eq!(sheet.value(a1("E6")).as_text(), Some("T7/Sat"));
        assert_eq!(sheet.value(a1("G6")).as_text(), Some("T2/Mon"));

        // Saturday and Sunday columns carry the weekend fill, down into the template block
        assert_eq!(sheet.style_name(a1("E5")), Some("date_header+weekend"));
        assert_eq!(sheet.style_name(a1("F7")), Some("time+weekend"));
        assert_eq!(sheet.style_name(a1("G7")), Some("time"));
    }

    #[test]
    fn test_blocks_are_staged_below_template() {
        let context = week_context();
        let mut builder = builder(&context);
        builder.run_until(Phase::PlaceBlocks).unwrap();

        let sheet = builder.sheet();
        // Template block occupies rows 7..12; employee 1 starts at row 13
        assert_eq!(sheet.value(a1("A13")).as_number(), Some(1.0));
        assert_eq!(
            sheet.value(a1("B13")).as_text(),
            Some("Employee 1\n@emp1\nBeta")
        );
        assert_eq!(sheet.value(a1("C13")).as_text(), Some(labels::START));
        assert_eq!(sheet.value(a1("C17")).as_text(), Some(labels::WORKING_TIME));
        assert_eq!(sheet.value(a1("D18")).as_text(), Some("Beta"));

        // Monday 03/03 is column G: 08:00 to 17:30 with a 90 minute break
        assert_eq!(sheet.value(a1("G13")).as_number(), Some(8.0 / 24.0));
        let closing = sheet.value(a1("G14")).as_number().unwrap();
        assert!((closing - 17.5 / 24.0).abs() < 1e-9);
        assert_eq!(sheet.value(a1("G15")).as_number(), Some(90.0 / 1440.0));
        assert_eq!(
            sheet.value(a1("G16")).as_formula(),
            Some("=IF(COUNT(G13:G14)<2,0,MAX(0,G14-G13-G15))")
        );
        assert_eq!(sheet.style_name(a1("G13")), Some("time+ticket+leave"));

        // Tuesday morning only: no break
        assert_eq!(sheet.value(a1("H15")).as_number(), Some(0.0));

        // Assigned project (Beta, second row) mirrors the day total
        assert_eq!(sheet.value(a1("G17")).as_number(), Some(0.0));
        assert_eq!(sheet.value(a1("G18")).as_formula(), Some("=G16"));
        assert_eq!(sheet.style_name(a1("G18")), Some("project+assigned"));

        // Employee 2 has no punches
        assert_eq!(sheet.value(a1("A20")).as_number(), Some(2.0));
        assert_eq!(sheet.value(a1("G20")), &CellValue::Empty);
        assert_eq!(sheet.value(a1("G24")).as_formula(), Some("=G23"));
    }

    #[test]
    fn test_template_block_removal_reanchors_formulas() {
        let context = week_context();
        let mut builder = builder(&context);
        builder.run_until(Phase::RemoveTemplateBlock).unwrap();

        let sheet = builder.sheet();
        assert_eq!(sheet.value(a1("A7")).as_number(), Some(1.0));
        assert_eq!(
            sheet.value(a1("G10")).as_formula(),
            Some("=IF(COUNT(G7:G8)<2,0,MAX(0,G8-G7-G9))")
        );
        assert_eq!(sheet.value(a1("G12")).as_formula(), Some("=G10"));
        assert_eq!(sheet.value(a1("A14")).as_number(), Some(2.0));
        // employees × (5 + P) rows below the header
        assert_eq!(sheet.last_row(), Some(6 + 2 * 7 - 1));
    }

    #[test]
    fn test_totals_and_merges() {
        let context = week_context();
        let mut builder = builder(&context);
        builder.run_until(Phase::InjectTotals).unwrap();

        let sheet = builder.sheet();
        let merges = sheet.merges();
        for range in ["A7:A13", "B7:B13", "C7:D7", "C10:D10", "C11:C12", "C13:D13", "A14:A20"] {
            assert!(
                merges.contains(&CellRange::from_a1(range).unwrap()),
                "missing merge {}",
                range
            );
        }

        assert_eq!(sheet.value(a1("L7")), &CellValue::Empty);
        assert_eq!(sheet.value(a1("L9")).as_formula(), Some("=SUM(E9:K9)"));
        assert_eq!(sheet.value(a1("L12")).as_formula(), Some("=SUM(E12:K12)"));
        assert_eq!(sheet.value(a1("G13")).as_formula(), Some("=SUM(G11:G12)"));
        assert_eq!(sheet.value(a1("L13")).as_formula(), Some("=SUM(E13:K13)"));
    }

    #[test]
    fn test_summary_and_signature() {
        let context = week_context();
        let mut builder = builder(&context);
        builder.run_until(Phase::BuildSummary).unwrap();

        let sheet = builder.sheet();
        // Grid ends at row 20; three blank rows; summary header on row 24
        assert_eq!(sheet.value(a1("B24")).as_text(), Some(labels::SUMMARY_PROJECT));
        assert_eq!(sheet.value(a1("B25")).as_text(), Some("Alpha"));
        assert_eq!(sheet.value(a1("D25")).as_formula(), Some("=SUM(L11,L18)"));
        assert_eq!(sheet.value(a1("D26")).as_formula(), Some("=SUM(L12,L19)"));
        assert_eq!(sheet.value(a1("D27")).as_formula(), Some("=SUM(D25:D26)"));
        assert_eq!(
            sheet.value(a1("D28")).as_formula(),
            Some("=IFERROR(D27*24/(8*$C$3*2),0)")
        );

        // Signature captions follow the last date column (K)
        assert_eq!(sheet.value(a1("H24")).as_text(), Some(labels::PREPARED_BY));
        assert_eq!(sheet.value(a1("L24")).as_text(), Some(labels::APPROVED_BY));
        assert_eq!(sheet.value(a1("L25")).as_text(), Some(labels::SIGNATURE_NOTE));
    }

    #[test]
    fn test_page_setup() {
        let context = week_context();
        let sheet = builder(&context).build().unwrap();

        let setup = sheet.page_setup();
        assert!(setup.landscape);
        assert!(setup.fit_to_width);
        assert_eq!(setup.print_area, CellRange::from_a1("A1:L20"));
        assert_eq!(setup.repeat_rows, Some((3, 5)));
        assert_eq!(setup.page_breaks, vec![23]);
    }

    #[test]
    fn test_phases_run_once_and_in_order() {
        let context = week_context();
        let mut builder = builder(&context);
        assert_eq!(builder.completed(), None);

        builder.run_until(Phase::PlaceBlocks).unwrap();
        let snapshot = builder.sheet().clone();
        builder.run_until(Phase::WriteHeader).unwrap();

        assert_eq!(builder.completed(), Some(Phase::PlaceBlocks));
        assert_eq!(builder.sheet().cells().count(), snapshot.cells().count());
    }

    #[test]
    fn test_full_month_keeps_every_date_column() {
        let period = ReportPeriod::new(make_date("2025-03-01"), make_date("2025-03-31")).unwrap();
        let context = ExportContext::new(period, vec![record(1, vec![])], vec![]);
        let mut builder = builder(&context);
        builder.run_until(Phase::RemoveTemplateBlock).unwrap();

        let sheet = builder.sheet();
        assert_eq!(sheet.value(a1("AI5")).as_text(), Some("31/03"));
        assert_eq!(sheet.value(a1("AJ4")).as_text(), Some("Tổng / Total"));
        assert_eq!(builder.layout().block_rows(), 5);
        assert_eq!(sheet.last_row(), Some(6 + 5 - 1));
    }

    #[test]
    fn test_empty_roster_still_builds() {
        let period = ReportPeriod::new(make_date("2025-03-03"), make_date("2025-03-03")).unwrap();
        let context = ExportContext::new(period, vec![], projects());
        let sheet = builder(&context).build().unwrap();

        // Summary header sits three rows below the column headers
        assert_eq!(sheet.value(a1("B10")).as_text(), Some(labels::SUMMARY_PROJECT));
        assert_eq!(sheet.value(a1("D11")).as_number(), Some(0.0));
        assert_eq!(sheet.value(a1("D13")).as_formula(), Some("=SUM(D11:D12)"));
        assert_eq!(
            sheet.value(a1("D14")).as_formula(),
            Some("=IFERROR(D13*24/(8*$C$3*0),0)")
        );
        assert_eq!(sheet.page_setup().print_area, CellRange::from_a1("A1:F6"));
    }

    #[test]
    fn test_period_longer_than_template() {
        let period = ReportPeriod::new(make_date("2025-03-01"), make_date("2025-04-01")).unwrap();
        let context = ExportContext::new(period, vec![], vec![]);
        let result = ReportBuilder::new(Template::load(TEMPLATE).unwrap(), &context);
        assert!(matches!(result, Err(ReportError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_sum_formula_chunks_arguments() {
        let refs: Vec<String> = (1..=300).map(|r| format!("A{}", r)).collect();
        let formula = sum_formula(&refs).unwrap();
        assert!(formula.starts_with("=SUM(A1,"));
        assert!(formula.contains(",A255)+SUM(A256,"));
        assert!(sum_formula(&[]).is_none());
    }
}
