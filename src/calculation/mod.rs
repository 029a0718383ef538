//! Calculation logic for the attendance report engine.
//!
//! This module contains the minute-resolution time primitives, the worked
//! duration calculator, the display-time normalizer and the day detection
//! helpers used to lay out date columns.

mod day_detection;
mod time_arithmetic;
mod time_normalizer;
mod work_duration;

pub use day_detection::{
    DayType, date_label, excel_serial_date, get_day_type, is_weekend, weekday_label,
};
pub use time_arithmetic::{
    MAX_WORKED_MINUTES, MINUTES_PER_DAY, QUARTER_HOUR_MINUTES, excel_time_fraction,
    format_duration, format_minutes_as_time, minutes_to_day_fraction, overlap_minutes,
    parse_time_to_minutes, round_down_to_quarter_hour, round_up_to_quarter_hour,
};
pub use time_normalizer::{
    DEFAULT_START_TIME, format_attendance_times, lunch_break_within, normalize_day_times,
};
pub use work_duration::calculate_work_duration;
