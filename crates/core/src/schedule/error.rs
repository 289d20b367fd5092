//! Schedule error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised by calendar arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// The computed date does not fit chrono's supported range.
    #[error("Date out of range: {anchor} + {offset} intervals")]
    DateOutOfRange {
        /// Anchor the offset was applied to.
        anchor: DateTime<Utc>,
        /// Number of intervals added.
        offset: u32,
    },

    /// Year/month pair does not name a calendar month.
    #[error("Invalid calendar month: {year}-{month}")]
    InvalidMonth {
        /// Year component.
        year: i32,
        /// Month component (1-12 expected).
        month: u32,
    },
}
