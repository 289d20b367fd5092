//! Recurrence expansion and balance aggregation engine for Cadence.
//!
//! Templates are never stored one row per occurrence. Every request expands
//! them into virtual occurrences, overlays per-occurrence edits and folds the
//! result into signed totals.
//!
//! # Modules
//!
//! - `schedule` - Calendar interval arithmetic
//! - `ledger` - Template types, balance arithmetic and the engine error
//! - `occurrence` - Expansion of templates into occurrences
//! - `overlay` - Edit record resolution and the edit write path
//! - `references` - Concurrent existence checks for referenced entities
//! - `repository` - Persistence collaborator traits and an in-memory store
//! - `aggregation` - Window listing and per-owner balances

pub mod aggregation;
pub mod ledger;
pub mod occurrence;
pub mod overlay;
pub mod references;
pub mod repository;
pub mod schedule;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregation::{LedgerService, OwnerBalance};
pub use ledger::LedgerError;
pub use occurrence::{Occurrence, OccurrenceExpander, Window};
pub use overlay::{EditOverlayResolver, EditWriter};
