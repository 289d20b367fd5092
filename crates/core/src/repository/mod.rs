//! Persistence collaborator seams.
//!
//! The engine only ever reads templates and edit records in batches, and
//! writes edit records through the overlay writer. Implementations own
//! their own concurrency control; handles are passed in by constructors.

pub mod error;
pub mod memory;

use async_trait::async_trait;
use cadence_shared::types::{TransactionId, WorkspaceId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use error::{RepositoryError, RepositoryResult};
pub use memory::InMemoryLedgerStore;

use crate::ledger::{Frequency, OwnerFilter, Transaction};
use crate::overlay::{EditRecord, InstallmentKey};

/// Kind of entity a transaction can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// An account.
    Account,
    /// A category.
    Category,
    /// A subcategory.
    Subcategory,
    /// A tag.
    Tag,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Account => write!(f, "Account"),
            Self::Category => write!(f, "Category"),
            Self::Subcategory => write!(f, "Subcategory"),
            Self::Tag => write!(f, "Tag"),
        }
    }
}

/// Reference to one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// Kind of entity.
    pub kind: EntityKind,
    /// Entity id.
    pub id: Uuid,
}

impl EntityRef {
    /// Creates a reference.
    #[must_use]
    pub const fn new(kind: EntityKind, id: Uuid) -> Self {
        Self { kind, id }
    }
}

/// Read access to template transactions.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    /// Templates owned by the selected owners, optionally narrowed to one frequency.
    async fn fetch_templates(
        &self,
        workspace_id: WorkspaceId,
        owners: &OwnerFilter,
        frequency: Option<Frequency>,
    ) -> RepositoryResult<Vec<Transaction>>;

    /// A single template by id.
    async fn fetch_template(
        &self,
        workspace_id: WorkspaceId,
        id: TransactionId,
    ) -> RepositoryResult<Option<Transaction>>;
}

/// Read access to edit records.
#[async_trait]
pub trait EditRecordSource: Send + Sync {
    /// Edit records matching any of `keys`, soft-deleted ones included.
    async fn fetch_edit_records(
        &self,
        workspace_id: WorkspaceId,
        keys: &[InstallmentKey],
    ) -> RepositoryResult<Vec<EditRecord>>;
}

/// Write access to edit records.
#[async_trait]
pub trait EditRecordSink: Send + Sync {
    /// Inserts or replaces the record stored under the record's key.
    async fn upsert_edit_record(&self, record: EditRecord) -> RepositoryResult<EditRecord>;
}

/// Existence checks for referenced entities.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityDirectory: Send + Sync {
    /// Returns true if the entity exists in the workspace.
    async fn exists(&self, workspace_id: WorkspaceId, entity: EntityRef) -> RepositoryResult<bool>;
}

/// Everything the engine needs from one store.
pub trait LedgerStore: TemplateSource + EditRecordSource + EditRecordSink + EntityDirectory {}

impl<T> LedgerStore for T where T: TemplateSource + EditRecordSource + EditRecordSink + EntityDirectory {}
