//! Listing and per-owner balance aggregation.

pub mod service;
pub mod types;


pub use service::{LedgerService, fold_balances};
pub use types::{BalanceSplit, OwnerBalance, OwnerKey};
