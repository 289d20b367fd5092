//! Aggregation result types.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::{Frequency, NetContribution};
use crate::occurrence::Occurrence;

/// Id of the account, category or subcategory a balance belongs to.
pub type OwnerKey = Uuid;

/// Projected and settled sums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSplit {
    /// Every occurrence up to the end of the period.
    pub total: Decimal,
    /// Confirmed occurrences only.
    pub current: Decimal,
}

impl BalanceSplit {
    /// Adds one occurrence's contribution.
    pub fn add(&mut self, occurrence: &Occurrence) {
        let net = occurrence.net();
        self.total += net;
        if occurrence.is_confirmed {
            self.current += net;
        }
    }

    /// Adds another split.
    pub fn absorb(&mut self, other: Self) {
        self.total += other.total;
        self.current += other.current;
    }
}

/// Balance of one owner at the end of a period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerBalance {
    /// Sum over every occurrence.
    pub total: Decimal,
    /// Sum over confirmed occurrences.
    pub current: Decimal,
    /// The same sums broken down by template frequency.
    pub by_frequency: BTreeMap<Frequency, BalanceSplit>,
}

impl OwnerBalance {
    /// Adds the split computed for templates of `frequency`.
    pub fn add(&mut self, frequency: Frequency, split: BalanceSplit) {
        self.total += split.total;
        self.current += split.current;
        self.by_frequency.entry(frequency).or_default().absorb(split);
    }
}
