//! Fixtures shared by unit tests.

use cadence_shared::types::{AccountId, TransactionId, WorkspaceId};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::ledger::{Balance, Frequency, RepeatSettings, Transaction, TransactionType};
use crate::schedule::IntervalUnit;

/// Midnight UTC on the given day.
pub(crate) fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// Asserts two decimals agree to twelve decimal places.
pub(crate) fn assert_close(actual: Decimal, expected: Decimal) {
    let diff = (actual - expected).abs();
    assert!(
        diff < dec!(0.000000000001),
        "expected {expected}, got {actual} (diff {diff})"
    );
}

/// Unconfirmed outflow of 100 due 2024-01-15.
pub(crate) fn template(frequency: Frequency) -> Transaction {
    Transaction {
        id: TransactionId::new(),
        workspace_id: WorkspaceId::new(),
        name: "Internet".to_string(),
        description: None,
        balance: Balance::from_value(dec!(100)),
        transaction_type: TransactionType::Outflow,
        frequency,
        repeat_settings: None,
        interval: None,
        due_date: at(2024, 1, 15),
        registration_date: Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap(),
        is_confirmed: false,
        confirmation_date: None,
        account_id: AccountId::new(),
        category_id: None,
        subcategory_id: None,
        tag_ids: Vec::new(),
    }
}

/// REPEAT template of `count` installments starting at position 1.
pub(crate) fn repeat_template(count: u32, interval: IntervalUnit) -> Transaction {
    Transaction {
        repeat_settings: Some(RepeatSettings {
            initial_installment: 1,
            count,
            interval,
            custom_day_count: None,
        }),
        ..template(Frequency::Repeat)
    }
}
