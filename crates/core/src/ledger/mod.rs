//! Template transactions and balance arithmetic.
//!
//! This module holds:
//! - Template transaction types (frequency, repeat settings, balance)
//! - The balance calculator (signed nets and sums)
//! - Template invariant validation
//! - The engine-wide error type

pub mod balance;
pub mod error;
pub mod types;
pub mod validation;

pub use balance::{BalanceCalculator, NetContribution};
pub use error::LedgerError;
pub use types::{
    Balance, Frequency, OwnerFilter, OwnerKind, RepeatSettings, Transaction, TransactionType,
};
pub use validation::validate_template;
