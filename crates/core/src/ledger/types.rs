//! Template transaction types.
//!
//! A template is the persisted shape of a transaction. It is a ledger entry
//! for its own anchor date only; the occurrence expander derives every other
//! date from it.

use std::str::FromStr;

use cadence_shared::types::{
    AccountId, CategoryId, SubcategoryId, TagId, TransactionId, WorkspaceId,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::LedgerError;
use crate::schedule::IntervalUnit;

/// Direction of money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money leaving the workspace. Contributes negatively.
    Outflow,
    /// Money entering the workspace. Contributes positively.
    Inflow,
    /// Unrecognised type tag. Contributes nothing.
    #[serde(other)]
    Unknown,
}

/// Repetition mode of a template.
///
/// Decoding goes through [`FromStr`], so an unrecognised tag fails with
/// [`LedgerError::UnknownFrequency`] instead of defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum Frequency {
    /// A single transaction.
    None,
    /// Open-ended repetition with no installment cap.
    Recurring,
    /// A fixed number of installments sharing one total.
    Repeat,
}

impl Frequency {
    /// All frequency modes, in aggregation order.
    pub const ALL: [Self; 3] = [Self::None, Self::Recurring, Self::Repeat];

    /// Wire tag for this mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Recurring => "RECURRING",
            Self::Repeat => "REPEAT",
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(Self::None),
            "RECURRING" => Ok(Self::Recurring),
            "REPEAT" => Ok(Self::Repeat),
            _ => Err(LedgerError::UnknownFrequency(s.to_string())),
        }
    }
}

impl TryFrom<String> for Frequency {
    type Error = LedgerError;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        tag.parse()
    }
}

/// Installment schedule of a REPEAT template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatSettings {
    /// First schedule position to materialise (1-based).
    pub initial_installment: u32,
    /// Total number of installments the template's net is split across.
    pub count: u32,
    /// Step between installments.
    #[serde(default)]
    pub interval: IntervalUnit,
    /// Days per step when `interval` is `CUSTOM`.
    #[serde(default)]
    pub custom_day_count: Option<u32>,
}

/// Monetary fields of a transaction.
///
/// Only the absolute amounts feed the net; the percentage fields are carried
/// for presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Base amount.
    pub value: Decimal,
    /// Parts cost added to the base amount.
    #[serde(default)]
    pub parts: Decimal,
    /// Labor cost added to the base amount.
    #[serde(default)]
    pub labor: Decimal,
    /// Absolute discount.
    #[serde(default)]
    pub discount: Decimal,
    /// Absolute interest.
    #[serde(default)]
    pub interest: Decimal,
    /// Discount expressed as a percentage of the value.
    #[serde(default)]
    pub discount_percentage: Decimal,
    /// Interest expressed as a percentage of the value.
    #[serde(default)]
    pub interest_percentage: Decimal,
    /// Signed net contribution.
    #[serde(default)]
    pub net: Decimal,
}

impl Balance {
    /// Creates a balance holding only a base value.
    #[must_use]
    pub fn from_value(value: Decimal) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    /// Splits every absolute amount, including `net`, into `count` equal shares.
    ///
    /// A `count` of zero returns the balance unchanged.
    #[must_use]
    pub fn prorated(&self, count: u32) -> Self {
        if count == 0 {
            return self.clone();
        }
        let divisor = Decimal::from(count);
        Self {
            value: self.value / divisor,
            parts: self.parts / divisor,
            labor: self.labor / divisor,
            discount: self.discount / divisor,
            interest: self.interest / divisor,
            discount_percentage: self.discount_percentage,
            interest_percentage: self.interest_percentage,
            net: self.net / divisor,
        }
    }
}

/// A persisted template transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Template identity.
    pub id: TransactionId,
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Monetary fields.
    pub balance: Balance,
    /// Outflow or inflow.
    pub transaction_type: TransactionType,
    /// Repetition mode.
    pub frequency: Frequency,
    /// Installment schedule; present iff `frequency` is `REPEAT`.
    #[serde(default)]
    pub repeat_settings: Option<RepeatSettings>,
    /// Step for `RECURRING` templates. Monthly when absent.
    #[serde(default)]
    pub interval: Option<IntervalUnit>,
    /// Date the transaction falls due.
    pub due_date: DateTime<Utc>,
    /// Date the transaction was registered.
    pub registration_date: DateTime<Utc>,
    /// Whether the transaction has been settled.
    #[serde(default)]
    pub is_confirmed: bool,
    /// Settlement timestamp; present iff `is_confirmed`.
    #[serde(default)]
    pub confirmation_date: Option<DateTime<Utc>>,
    /// Owning account.
    pub account_id: AccountId,
    /// Owning category.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Owning subcategory.
    #[serde(default)]
    pub subcategory_id: Option<SubcategoryId>,
    /// Attached tags.
    #[serde(default)]
    pub tag_ids: Vec<TagId>,
}

impl Transaction {
    /// Date the schedule is anchored on: the confirmation date when confirmed,
    /// the due date otherwise.
    #[must_use]
    pub fn anchor_date(&self) -> DateTime<Utc> {
        match (self.is_confirmed, self.confirmation_date) {
            (true, Some(confirmed_at)) => confirmed_at,
            _ => self.due_date,
        }
    }

    /// Returns the id of the owner of the given kind, if the template has one.
    #[must_use]
    pub fn owner_id(&self, kind: OwnerKind) -> Option<Uuid> {
        match kind {
            OwnerKind::Account => Some(self.account_id.into_inner()),
            OwnerKind::Category => self.category_id.map(CategoryId::into_inner),
            OwnerKind::Subcategory => self.subcategory_id.map(SubcategoryId::into_inner),
        }
    }
}

/// Entity a balance is aggregated under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    /// Aggregate per account.
    Account,
    /// Aggregate per category.
    Category,
    /// Aggregate per subcategory.
    Subcategory,
}

/// Selects templates by owning entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerFilter {
    /// Kind of owner the ids refer to.
    pub kind: OwnerKind,
    /// Owner ids; empty means every owner of this kind.
    pub ids: Vec<Uuid>,
}

impl OwnerFilter {
    /// Filter matching the given owners.
    #[must_use]
    pub fn new(kind: OwnerKind, ids: Vec<Uuid>) -> Self {
        Self { kind, ids }
    }

    /// Filter matching every owner of `kind`.
    #[must_use]
    pub fn all(kind: OwnerKind) -> Self {
        Self {
            kind,
            ids: Vec::new(),
        }
    }

    /// Returns true if the template belongs to one of the selected owners.
    #[must_use]
    pub fn matches(&self, transaction: &Transaction) -> bool {
        match transaction.owner_id(self.kind) {
            Some(owner) => self.ids.is_empty() || self.ids.contains(&owner),
            None => false,
        }
    }
}
