//! In-memory store backed by concurrent maps.

use async_trait::async_trait;
use cadence_shared::types::{TransactionId, WorkspaceId};
use dashmap::{DashMap, DashSet};

use super::{
    EditRecordSink, EditRecordSource, EntityDirectory, EntityRef, RepositoryResult,
    TemplateSource,
};
use crate::ledger::{Frequency, OwnerFilter, Transaction};
use crate::overlay::{EditRecord, InstallmentKey};

type EditKey = (WorkspaceId, TransactionId, u32);

/// Store keeping templates, edit records and known entities in memory.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    templates: DashMap<(WorkspaceId, TransactionId), Transaction>,
    edits: DashMap<EditKey, EditRecord>,
    entities: DashSet<(WorkspaceId, EntityRef)>,
}

impl InMemoryLedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a template.
    pub fn insert_template(&self, template: Transaction) {
        self.templates
            .insert((template.workspace_id, template.id), template);
    }

    /// Inserts or replaces an edit record.
    pub fn insert_edit_record(&self, record: EditRecord) {
        self.edits.insert(
            (record.workspace_id, record.main_id, record.installment),
            record,
        );
    }

    /// Registers an entity as existing in `workspace_id`.
    pub fn register_entity(&self, workspace_id: WorkspaceId, entity: EntityRef) {
        self.entities.insert((workspace_id, entity));
    }

    /// Returns the edit record stored under `key`.
    #[must_use]
    pub fn edit_record(&self, workspace_id: WorkspaceId, key: InstallmentKey) -> Option<EditRecord> {
        self.edits
            .get(&(workspace_id, key.template_id, key.installment))
            .map(|entry| entry.value().clone())
    }

    /// Number of stored edit records, deleted ones included.
    #[must_use]
    pub fn edit_record_count(&self) -> usize {
        self.edits.len()
    }
}

#[async_trait]
impl TemplateSource for InMemoryLedgerStore {
    async fn fetch_templates(
        &self,
        workspace_id: WorkspaceId,
        owners: &OwnerFilter,
        frequency: Option<Frequency>,
    ) -> RepositoryResult<Vec<Transaction>> {
        let mut templates: Vec<Transaction> = self
            .templates
            .iter()
            .filter(|entry| entry.key().0 == workspace_id)
            .map(|entry| entry.value().clone())
            .filter(|template| owners.matches(template))
            .filter(|template| frequency.is_none_or(|f| template.frequency == f))
            .collect();
        templates.sort_by_key(|template| template.id);
        Ok(templates)
    }

    async fn fetch_template(
        &self,
        workspace_id: WorkspaceId,
        id: TransactionId,
    ) -> RepositoryResult<Option<Transaction>> {
        Ok(self
            .templates
            .get(&(workspace_id, id))
            .map(|entry| entry.value().clone()))
    }
}

#[async_trait]
impl EditRecordSource for InMemoryLedgerStore {
    async fn fetch_edit_records(
        &self,
        workspace_id: WorkspaceId,
        keys: &[InstallmentKey],
    ) -> RepositoryResult<Vec<EditRecord>> {
        Ok(keys
            .iter()
            .filter_map(|key| self.edit_record(workspace_id, *key))
            .collect())
    }
}

#[async_trait]
impl EditRecordSink for InMemoryLedgerStore {
    async fn upsert_edit_record(&self, record: EditRecord) -> RepositoryResult<EditRecord> {
        self.insert_edit_record(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl EntityDirectory for InMemoryLedgerStore {
    async fn exists(&self, workspace_id: WorkspaceId, entity: EntityRef) -> RepositoryResult<bool> {
        Ok(self.entities.contains(&(workspace_id, entity)))
    }
}
