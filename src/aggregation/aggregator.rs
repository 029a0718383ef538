//! Joins attendance rows with approved tickets per employee and day.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::calculation::calculate_work_duration;
use crate::error::ReportResult;
use crate::models::{AttendanceRecord, DayEntry, EmployeeId, LeaveTicket, ReportPeriod};

use super::store::AttendanceStore;

/// Builds one [`AttendanceRecord`] per requested employee.
///
/// Every requested employee present in the roster gets a record, even with no
/// attendance rows, so the report roster does not depend on data
/// completeness. Records follow roster order as returned by the store;
/// duplicate ids are collapsed and ids unknown to the store are skipped with a
/// warning.
///
/// Tickets attach to the attendance row with the same `(employee, day)` key;
/// a row with no ticket gets an empty list. Worked minutes are computed from
/// the raw punches under each employee's shift policy.
///
/// # Errors
///
/// Propagates storage failures and malformed punch times.
pub async fn aggregate_attendance(
    store: &dyn AttendanceStore,
    employee_ids: &[EmployeeId],
    period: &ReportPeriod,
) -> ReportResult<Vec<AttendanceRecord>> {
    let mut seen = HashSet::new();
    let requested: Vec<EmployeeId> = employee_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();

    let (from, to) = period.query_bounds();
    let roster = store.employees_by_ids(&requested).await?;
    let entries = store.attendance_entries(&requested, from, to).await?;
    let tickets = store.approved_tickets(&requested, from, to).await?;

    debug!(
        employees = roster.len(),
        entries = entries.len(),
        tickets = tickets.len(),
        "Loaded attendance data"
    );

    let mut tickets_by_day: HashMap<(EmployeeId, NaiveDate), Vec<LeaveTicket>> = HashMap::new();
    for ticket in tickets {
        tickets_by_day
            .entry((ticket.employee_id, ticket.date))
            .or_default()
            .push(ticket);
    }

    for id in requested.iter().filter(|id| !roster.iter().any(|e| e.id == **id)) {
        warn!(employee_id = *id, "Requested employee not found in roster");
    }

    let mut placed = HashSet::new();
    let mut records = Vec::with_capacity(requested.len());
    for employee in roster.iter().filter(|e| requested.contains(&e.id)) {
        if !placed.insert(employee.id) {
            continue;
        }
        let id = employee.id;

        let mut days: Vec<DayEntry> = Vec::new();
        for entry in entries.iter().filter(|e| e.employee_id == id) {
            if days.iter().any(|d| d.date == entry.date) {
                warn!(
                    employee_id = id,
                    date = %entry.date,
                    "Duplicate attendance row ignored"
                );
                continue;
            }

            let worked_minutes = calculate_work_duration(
                entry.start_time.as_deref(),
                entry.end_time.as_deref(),
                employee.shift_policy,
            )?;

            days.push(DayEntry {
                date: entry.date,
                start_time: entry.start_time.clone(),
                end_time: entry.end_time.clone(),
                worked_minutes,
                display_start: None,
                display_end: None,
                tickets: tickets_by_day.remove(&(id, entry.date)).unwrap_or_default(),
            });
        }
        days.sort_by_key(|d| d.date);

        records.push(AttendanceRecord {
            employee: employee.clone(),
            days,
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::MemoryStore;
    use crate::models::{ApprovalState, Employee, RawAttendanceEntry, ShiftPolicy, TicketType};

    fn make_date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn employee(id: EmployeeId, policy: ShiftPolicy) -> Employee {
        Employee {
            id,
            name: format!("Employee {}", id),
            username: format!("emp{}", id),
            shift_policy: policy,
        }
    }

    fn row(id: EmployeeId, date: &str, start: &str, end: &str) -> RawAttendanceEntry {
        RawAttendanceEntry {
            employee_id: id,
            date: make_date(date),
            start_time: Some(start.to_string()),
            end_time: Some(end.to_string()),
            deleted: false,
        }
    }

    fn ticket(id: EmployeeId, date: &str, ticket_type: TicketType) -> LeaveTicket {
        LeaveTicket {
            employee_id: id,
            date: make_date(date),
            ticket_type,
            approval_state: ApprovalState::Approved,
            note: None,
            deleted: false,
        }
    }

    fn period() -> ReportPeriod {
        ReportPeriod::new(make_date("2025-03-01"), make_date("2025-03-31")).unwrap()
    }

    fn store() -> MemoryStore {
        MemoryStore {
            employees: vec![
                employee(1, ShiftPolicy::Standard),
                employee(2, ShiftPolicy::ShortLunch),
                employee(3, ShiftPolicy::Standard),
            ],
            attendance: vec![
                row(1, "2025-03-04", "08:00", "18:30"),
                row(1, "2025-03-03", "08:00", "11:53"),
                row(2, "2025-03-03", "08:00", "18:00"),
            ],
            tickets: vec![
                ticket(1, "2025-03-03", TicketType::LateArrival),
                ticket(1, "2025-03-03", TicketType::Leave),
                ticket(2, "2025-03-10", TicketType::Leave),
            ],
        }
    }

    #[tokio::test]
    async fn test_records_follow_roster_order() {
        let records = aggregate_attendance(&store(), &[3, 1, 2], &period())
            .await
            .unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.employee.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_employee_without_rows_gets_empty_days() {
        let records = aggregate_attendance(&store(), &[3], &period()).await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].days.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_and_duplicate_ids_are_collapsed() {
        let records = aggregate_attendance(&store(), &[1, 42, 1], &period())
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].employee.id, 1);
    }

    #[tokio::test]
    async fn test_days_are_sorted_and_durations_computed() {
        let records = aggregate_attendance(&store(), &[1, 2], &period())
            .await
            .unwrap();

        let first = &records[0];
        assert_eq!(first.days.len(), 2);
        assert_eq!(first.days[0].date, make_date("2025-03-03"));
        assert_eq!(first.days[0].worked_minutes, 225);
        assert_eq!(first.days[1].worked_minutes, 480);

        assert_eq!(records[1].days[0].worked_minutes, 480);
    }

    #[tokio::test]
    async fn test_tickets_join_on_employee_and_day() {
        let records = aggregate_attendance(&store(), &[1, 2], &period())
            .await
            .unwrap();

        let monday = &records[0].days[0];
        assert_eq!(monday.tickets.len(), 2);
        assert!(monday.is_approved_leave());
        assert!(records[0].days[1].tickets.is_empty());

        // Ticket on a day without an attendance row has nothing to attach to
        assert!(records[1].days.iter().all(|d| d.tickets.is_empty()));
    }

    #[tokio::test]
    async fn test_malformed_punch_is_reported() {
        let mut store = store();
        store.attendance.push(row(3, "2025-03-05", "8h", "17:00"));
        let result = aggregate_attendance(&store, &[3], &period()).await;
        assert!(result.is_err());
    }
}
