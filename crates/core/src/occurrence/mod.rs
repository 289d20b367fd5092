//! Expansion of template transactions into virtual occurrences.

pub mod expander;
pub mod types;


pub use expander::{DEFAULT_RECURRING_HORIZON_MONTHS, OccurrenceExpander, expand_window};
pub use types::{Occurrence, Window};
