//! Window and occurrence types.

use cadence_shared::types::{
    AccountId, CategoryId, EditRecordId, SubcategoryId, TagId, TransactionId, WorkspaceId,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::{
    Balance, BalanceCalculator, Frequency, NetContribution, OwnerKind, RepeatSettings,
    TransactionType,
};
use crate::schedule::{IntervalUnit, ScheduleError, month_start, next_month};

/// Half-open reporting range `[start, end)`. A missing bound is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Window {
    /// Inclusive lower bound.
    pub start: Option<DateTime<Utc>>,
    /// Exclusive upper bound.
    pub end: Option<DateTime<Utc>>,
}

impl Window {
    /// Creates a window from optional bounds.
    #[must_use]
    pub const fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Window with no bounds at all.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Window `[start, end)`.
    #[must_use]
    pub const fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Exactly one calendar month.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleError::InvalidMonth` for an invalid month.
    pub fn month(year: i32, month: u32) -> Result<Self, ScheduleError> {
        let start = month_start(year, month)?;
        let (next_year, next) = next_month(year, month)?;
        Ok(Self::between(start, month_start(next_year, next)?))
    }

    /// Everything up to the end of the given month.
    ///
    /// # Errors
    ///
    /// Returns `ScheduleError::InvalidMonth` for an invalid month.
    pub fn through_month(year: i32, month: u32) -> Result<Self, ScheduleError> {
        let (next_year, next) = next_month(year, month)?;
        Ok(Self::new(None, Some(month_start(next_year, next)?)))
    }

    /// Returns true if `at` lies inside the window.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| at >= start) && self.end.is_none_or(|end| at < end)
    }
}

/// A computed, never-persisted instance of a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Public identity, always the template's id.
    pub id: TransactionId,
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// This occurrence's share of the template balance.
    pub balance: Balance,
    /// Full template balance, kept for REPEAT occurrences.
    pub total_balance: Option<Balance>,
    /// Outflow or inflow.
    pub transaction_type: TransactionType,
    /// Repetition mode of the template.
    pub frequency: Frequency,
    /// Repeat schedule of the template.
    pub repeat_settings: Option<RepeatSettings>,
    /// Step of a RECURRING template.
    pub interval: Option<IntervalUnit>,
    /// Absolute position in the template's schedule (1-based).
    pub schedule_position: u32,
    /// Display sequence within the expanded window (1-based).
    pub installment: u32,
    /// Due date of this occurrence.
    pub due_date: DateTime<Utc>,
    /// Registration date moved to this occurrence's month.
    pub registration_date: DateTime<Utc>,
    /// Whether the occurrence is settled.
    pub is_confirmed: bool,
    /// Settlement timestamp moved to this occurrence's due date.
    pub confirmation_date: Option<DateTime<Utc>>,
    /// Owning account.
    pub account_id: AccountId,
    /// Owning category.
    pub category_id: Option<CategoryId>,
    /// Owning subcategory.
    pub subcategory_id: Option<SubcategoryId>,
    /// Attached tags.
    pub tag_ids: Vec<TagId>,
    /// Back-reference to the template the occurrence was expanded from.
    /// Cleared once an edit record has been merged in.
    pub main_template_id: Option<TransactionId>,
    /// Edit record merged into this occurrence, if any.
    pub edit_id: Option<EditRecordId>,
}

impl Occurrence {
    /// Date used for window checks: the confirmation date when confirmed,
    /// the due date otherwise.
    #[must_use]
    pub fn reference_date(&self) -> DateTime<Utc> {
        match (self.is_confirmed, self.confirmation_date) {
            (true, Some(confirmed_at)) => confirmed_at,
            _ => self.due_date,
        }
    }

    /// Returns the id of the owner of the given kind, if any.
    #[must_use]
    pub fn owner_id(&self, kind: OwnerKind) -> Option<Uuid> {
        match kind {
            OwnerKind::Account => Some(self.account_id.into_inner()),
            OwnerKind::Category => self.category_id.map(CategoryId::into_inner),
            OwnerKind::Subcategory => self.subcategory_id.map(SubcategoryId::into_inner),
        }
    }

    /// Returns true if an edit record has been merged into this occurrence.
    #[must_use]
    pub fn is_edited(&self) -> bool {
        self.edit_id.is_some()
    }
}

impl NetContribution for Occurrence {
    fn net(&self) -> Decimal {
        BalanceCalculator::net_of(&self.balance, self.transaction_type)
    }
}
