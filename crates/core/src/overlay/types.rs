//! Edit record types.

use cadence_shared::types::{
    AccountId, CategoryId, EditRecordId, SubcategoryId, TagId, TransactionId, WorkspaceId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::{Balance, Transaction, TransactionType};
use crate::repository::{EntityKind, EntityRef};

/// Addresses one occurrence of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstallmentKey {
    /// Template the occurrence was expanded from.
    pub template_id: TransactionId,
    /// 1-based installment index.
    pub installment: u32,
}

impl InstallmentKey {
    /// Creates a key.
    #[must_use]
    pub const fn new(template_id: TransactionId, installment: u32) -> Self {
        Self {
            template_id,
            installment,
        }
    }
}

/// Stored override for a single occurrence.
///
/// At most one live record exists per `(workspace_id, main_id, installment)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditRecord {
    /// Record id.
    pub id: EditRecordId,
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// Template the record overrides.
    pub main_id: TransactionId,
    /// Installment the record overrides.
    pub installment: u32,
    /// Soft-delete flag. A deleted record suppresses its occurrence.
    pub is_deleted: bool,
    /// Transaction-shaped content merged over the occurrence.
    pub payload: Transaction,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl EditRecord {
    /// Key of the occurrence this record overrides.
    #[must_use]
    pub const fn key(&self) -> InstallmentKey {
        InstallmentKey::new(self.main_id, self.installment)
    }
}

/// Change to an occurrence's confirmation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ConfirmationChange {
    /// Mark as settled at the given instant.
    Confirmed {
        /// Settlement instant.
        at: DateTime<Utc>,
    },
    /// Mark as pending.
    Unconfirmed,
}

/// Partial update applied to one occurrence. Unset fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditInput {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New balance.
    pub balance: Option<Balance>,
    /// New direction.
    pub transaction_type: Option<TransactionType>,
    /// New due date.
    pub due_date: Option<DateTime<Utc>>,
    /// New registration date.
    pub registration_date: Option<DateTime<Utc>>,
    /// New confirmation state.
    pub confirmation: Option<ConfirmationChange>,
    /// New account.
    pub account_id: Option<AccountId>,
    /// New category.
    pub category_id: Option<CategoryId>,
    /// New subcategory.
    pub subcategory_id: Option<SubcategoryId>,
    /// Replacement tag set.
    pub tag_ids: Option<Vec<TagId>>,
}

impl EditInput {
    /// Entities the input points at, in field order.
    #[must_use]
    pub fn references(&self) -> Vec<EntityRef> {
        let mut refs = Vec::new();
        if let Some(id) = self.account_id {
            refs.push(EntityRef::new(EntityKind::Account, id.into_inner()));
        }
        if let Some(id) = self.category_id {
            refs.push(EntityRef::new(EntityKind::Category, id.into_inner()));
        }
        if let Some(id) = self.subcategory_id {
            refs.push(EntityRef::new(EntityKind::Subcategory, id.into_inner()));
        }
        if let Some(tags) = &self.tag_ids {
            refs.extend(
                tags.iter()
                    .map(|id| EntityRef::new(EntityKind::Tag, id.into_inner())),
            );
        }
        refs
    }

    /// Writes the set fields into `payload`.
    pub fn apply_to(self, payload: &mut Transaction) {
        if let Some(name) = self.name {
            payload.name = name;
        }
        if let Some(description) = self.description {
            payload.description = Some(description);
        }
        if let Some(balance) = self.balance {
            payload.balance = balance;
        }
        if let Some(transaction_type) = self.transaction_type {
            payload.transaction_type = transaction_type;
        }
        if let Some(due_date) = self.due_date {
            payload.due_date = due_date;
        }
        if let Some(registration_date) = self.registration_date {
            payload.registration_date = registration_date;
        }
        match self.confirmation {
            Some(ConfirmationChange::Confirmed { at }) => {
                payload.is_confirmed = true;
                payload.confirmation_date = Some(at);
            }
            Some(ConfirmationChange::Unconfirmed) => {
                payload.is_confirmed = false;
                payload.confirmation_date = None;
            }
            None => {}
        }
        if let Some(account_id) = self.account_id {
            payload.account_id = account_id;
        }
        if let Some(category_id) = self.category_id {
            payload.category_id = Some(category_id);
        }
        if let Some(subcategory_id) = self.subcategory_id {
            payload.subcategory_id = Some(subcategory_id);
        }
        if let Some(tag_ids) = self.tag_ids {
            payload.tag_ids = tag_ids;
        }
    }
}
