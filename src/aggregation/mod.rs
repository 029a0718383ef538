//! Attendance aggregation at the storage boundary.
//!
//! This module reads the roster, attendance rows and approved tickets from an
//! [`AttendanceStore`] and joins them into per-employee records.

mod aggregator;
mod store;

pub use aggregator::aggregate_attendance;
pub use store::{AttendanceStore, MemoryStore};
