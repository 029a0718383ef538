//! Attendance Report Engine
//!
//! This crate turns clock-in/clock-out punches into policy-adjusted worked
//! durations and synthesizes a printable monthly attendance worksheet from a
//! template: one block per employee, per-day and per-project totals, a project
//! summary and a signature area.

#![warn(missing_docs)]

pub mod aggregation;
pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod report;
