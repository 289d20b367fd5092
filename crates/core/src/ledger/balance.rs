//! Signed net amounts.
//!
//! Discount reduces the magnitude and interest increases it, for both
//! directions; the transaction type only decides the sign.

use rust_decimal::Decimal;

use super::types::{Balance, Transaction, TransactionType};

/// Anything that contributes a signed amount to a balance.
pub trait NetContribution {
    /// Signed contribution of this item.
    fn net(&self) -> Decimal;
}

/// Pure balance arithmetic.
pub struct BalanceCalculator;

impl BalanceCalculator {
    /// Unsigned magnitude: `value + parts + labor - discount + interest`.
    #[must_use]
    pub fn gross(balance: &Balance) -> Decimal {
        balance.value + balance.parts + balance.labor - balance.discount + balance.interest
    }

    /// Signed net of a balance under the given transaction type.
    ///
    /// Outflows are negative, inflows positive, unknown types contribute zero.
    #[must_use]
    pub fn net_of(balance: &Balance, transaction_type: TransactionType) -> Decimal {
        match transaction_type {
            TransactionType::Outflow => -Self::gross(balance),
            TransactionType::Inflow => Self::gross(balance),
            TransactionType::Unknown => Decimal::ZERO,
        }
    }

    /// Returns a copy of `balance` with `net` recomputed.
    #[must_use]
    pub fn settle(balance: &Balance, transaction_type: TransactionType) -> Balance {
        Balance {
            net: Self::net_of(balance, transaction_type),
            ..balance.clone()
        }
    }

    /// Sum of the signed contributions of `items`.
    #[must_use]
    pub fn sum_net<'a, T, I>(items: I) -> Decimal
    where
        T: NetContribution + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        items.into_iter().map(NetContribution::net).sum()
    }
}

impl NetContribution for Transaction {
    fn net(&self) -> Decimal {
        BalanceCalculator::net_of(&self.balance, self.transaction_type)
    }
}
