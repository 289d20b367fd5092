//! Calendar arithmetic for recurrence schedules.
//!
//! Pure functions only: adding intervals to an anchor, counting elapsed
//! periods, and projecting a day-of-month onto shorter months.

pub mod error;
pub mod interval;

#[cfg(test)]
mod interval_props;

pub use error::ScheduleError;
pub use interval::{
    IntervalStep, IntervalUnit, add_interval, clamp_day, days_in_month, elapsed_periods, month_start,
    move_to_date, next_month, periods_between, project_onto_month,
};
