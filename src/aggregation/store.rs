//! The storage boundary.
//!
//! Attendance rows, tickets and the roster live in an external store. The
//! engine only needs three filtered reads from it, described by the
//! [`AttendanceStore`] trait. [`MemoryStore`] answers them from data held in
//! memory, loaded from a YAML or JSON document.

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, ReportResult};
use crate::models::{ApprovalState, Employee, EmployeeId, LeaveTicket, RawAttendanceEntry};

/// Read access to employees, attendance rows and tickets.
///
/// Implementations must exclude soft-deleted rows and only return rows whose
/// calendar day falls inside `[from, to]`.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Employees whose id is in `ids`.
    async fn employees_by_ids(&self, ids: &[EmployeeId]) -> ReportResult<Vec<Employee>>;

    /// Non-deleted attendance rows for `ids` within the bounds, ordered by date.
    async fn attendance_entries(
        &self,
        ids: &[EmployeeId],
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> ReportResult<Vec<RawAttendanceEntry>>;

    /// Non-deleted approved tickets for `ids` within the bounds, ordered by date.
    async fn approved_tickets(
        &self,
        ids: &[EmployeeId],
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> ReportResult<Vec<LeaveTicket>>;
}

/// An [`AttendanceStore`] backed by vectors.
///
/// # Example
///
/// ```
/// use attendance_report::aggregation::MemoryStore;
///
/// let store: MemoryStore = serde_yaml::from_str(r#"
/// employees:
///   - { id: 1, name: "Pham Van D", username: "phamd", shift_policy: 30 }
/// attendance:
///   - { employee_id: 1, date: 2025-03-03, start_time: "08:05", end_time: "17:10" }
/// "#).unwrap();
/// assert_eq!(store.employees.len(), 1);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    /// The roster.
    #[serde(default)]
    pub employees: Vec<Employee>,
    /// Attendance rows, including soft-deleted ones.
    #[serde(default)]
    pub attendance: Vec<RawAttendanceEntry>,
    /// Tickets in every state, including soft-deleted ones.
    #[serde(default)]
    pub tickets: Vec<LeaveTicket>,
}

impl MemoryStore {
    /// Loads a store from a YAML (or JSON) document.
    pub fn load<P: AsRef<Path>>(path: P) -> ReportResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ReportError::Storage {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        serde_yaml::from_str(&content).map_err(|e| ReportError::Storage {
            message: format!("cannot parse {}: {}", path.display(), e),
        })
    }
}

fn within(date: chrono::NaiveDate, from: NaiveDateTime, to: NaiveDateTime) -> bool {
    date >= from.date() && date <= to.date()
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn employees_by_ids(&self, ids: &[EmployeeId]) -> ReportResult<Vec<Employee>> {
        Ok(self
            .employees
            .iter()
            .filter(|e| ids.contains(&e.id))
            .cloned()
            .collect())
    }

    async fn attendance_entries(
        &self,
        ids: &[EmployeeId],
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> ReportResult<Vec<RawAttendanceEntry>> {
        let mut rows: Vec<RawAttendanceEntry> = self
            .attendance
            .iter()
            .filter(|row| !row.deleted && ids.contains(&row.employee_id))
            .filter(|row| within(row.date, from, to))
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.date);
        Ok(rows)
    }

    async fn approved_tickets(
        &self,
        ids: &[EmployeeId],
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> ReportResult<Vec<LeaveTicket>> {
        let mut rows: Vec<LeaveTicket> = self
            .tickets
            .iter()
            .filter(|t| !t.deleted && t.approval_state == ApprovalState::Approved)
            .filter(|t| ids.contains(&t.employee_id) && within(t.date, from, to))
            .cloned()
            .collect();
        rows.sort_by_key(|t| t.date);
        Ok(rows)
    }
}
