//! Write path for per-occurrence overrides.
//!
//! Edit records are created lazily: the first edit or delete of an
//! occurrence synthesises a record from the template, stamped with the
//! occurrence's key. Templates are never modified.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use cadence_shared::types::{EditRecordId, TransactionId, WorkspaceId};
use cadence_shared::{EngineConfig, OverlayMatching};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use tracing::{info, instrument};

use super::resolver::EditOverlayResolver;
use super::types::{EditInput, EditRecord, InstallmentKey};
use crate::ledger::{Frequency, LedgerError, Transaction};
use crate::occurrence::OccurrenceExpander;
use crate::references::ReferenceValidator;
use crate::repository::{EntityDirectory, LedgerStore};

/// Creates, updates and soft-deletes edit records.
pub struct EditWriter<S> {
    store: Arc<S>,
    resolver: EditOverlayResolver,
    references: ReferenceValidator,
}

impl<S: LedgerStore + 'static> EditWriter<S> {
    /// Creates a writer over `store`.
    #[must_use]
    pub fn new(store: Arc<S>, config: &EngineConfig) -> Self {
        let directory: Arc<dyn EntityDirectory> = store.clone();
        Self {
            store,
            resolver: EditOverlayResolver::from(config),
            references: ReferenceValidator::new(directory),
        }
    }

    /// Applies `input` to one occurrence, creating its edit record if needed.
    ///
    /// # Errors
    ///
    /// - `TemplateNotFound` if the template does not exist
    /// - `ReferenceNotFound` if the input points at a missing entity
    /// - `InvalidInstallment` if the template has no such installment
    /// - `Repository` if the store fails
    #[instrument(skip(self, input), fields(%workspace_id, %template_id))]
    pub async fn edit_occurrence(
        &self,
        workspace_id: WorkspaceId,
        template_id: TransactionId,
        installment: u32,
        input: EditInput,
    ) -> Result<EditRecord, LedgerError> {
        let template = self.load_template(workspace_id, template_id).await?;
        self.references
            .validate(workspace_id, &input.references())
            .await?;

        let key = InstallmentKey::new(template_id, installment);
        let now = Utc::now();
        let mut record = match self
            .resolver
            .resolve(&*self.store, workspace_id, key)
            .await?
        {
            Some(existing) => existing,
            None => self.synthesize(&template, key, now)?,
        };
        input.apply_to(&mut record.payload);
        record.updated_at = now;

        let saved = self.store.upsert_edit_record(record).await?;
        info!(edit_id = %saved.id, installment, "occurrence edited");
        Ok(saved)
    }

    /// Soft-deletes the given occurrences. Duplicate keys are collapsed.
    ///
    /// # Errors
    ///
    /// Same as [`Self::edit_occurrence`], minus reference checks.
    #[instrument(skip(self, keys), fields(%workspace_id, keys = keys.len()))]
    pub async fn delete_occurrences(
        &self,
        workspace_id: WorkspaceId,
        keys: &[InstallmentKey],
    ) -> Result<Vec<EditRecord>, LedgerError> {
        let keys: BTreeSet<InstallmentKey> = keys.iter().copied().collect();
        let template_ids: BTreeSet<TransactionId> =
            keys.iter().map(|key| key.template_id).collect();

        let templates: HashMap<TransactionId, Transaction> = try_join_all(
            template_ids
                .into_iter()
                .map(|id| self.load_template(workspace_id, id)),
        )
        .await?
        .into_iter()
        .map(|template| (template.id, template))
        .collect();

        let lookup: Vec<InstallmentKey> = keys.iter().copied().collect();
        let mut existing: HashMap<InstallmentKey, EditRecord> = self
            .store
            .fetch_edit_records(workspace_id, &lookup)
            .await?
            .into_iter()
            .map(|record| (record.key(), record))
            .collect();

        let now = Utc::now();
        let mut saved = Vec::with_capacity(lookup.len());
        for key in lookup {
            let mut record = match existing.remove(&key) {
                Some(record) => record,
                None => {
                    let template = templates
                        .get(&key.template_id)
                        .ok_or(LedgerError::TemplateNotFound(key.template_id))?;
                    self.synthesize(template, key, now)?
                }
            };
            record.is_deleted = true;
            record.updated_at = now;
            saved.push(self.store.upsert_edit_record(record).await?);
        }

        info!(deleted = saved.len(), "occurrences deleted");
        Ok(saved)
    }

    async fn load_template(
        &self,
        workspace_id: WorkspaceId,
        template_id: TransactionId,
    ) -> Result<Transaction, LedgerError> {
        self.store
            .fetch_template(workspace_id, template_id)
            .await?
            .ok_or(LedgerError::TemplateNotFound(template_id))
    }

    /// Copies `template` into a new record for `key`, with the dates and
    /// balance share of the occurrence the key addresses.
    fn synthesize(
        &self,
        template: &Transaction,
        key: InstallmentKey,
        now: DateTime<Utc>,
    ) -> Result<EditRecord, LedgerError> {
        let invalid = || LedgerError::InvalidInstallment {
            template_id: key.template_id,
            installment: key.installment,
        };
        if key.installment == 0 {
            return Err(invalid());
        }

        let position = match self.resolver.matching() {
            OverlayMatching::SchedulePosition => key.installment,
            OverlayMatching::DisplaySequence => first_position(template)
                .checked_add(key.installment - 1)
                .ok_or_else(invalid)?,
        };
        let occurrence =
            OccurrenceExpander::occurrence_at(template, position)?.ok_or_else(invalid)?;

        let payload = Transaction {
            balance: occurrence.balance,
            due_date: occurrence.due_date,
            registration_date: occurrence.registration_date,
            confirmation_date: occurrence.confirmation_date,
            ..template.clone()
        };

        Ok(EditRecord {
            id: EditRecordId::new(),
            workspace_id: template.workspace_id,
            main_id: template.id,
            installment: key.installment,
            is_deleted: false,
            payload,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Schedule position of a template's first occurrence.
fn first_position(template: &Transaction) -> u32 {
    match (template.frequency, &template.repeat_settings) {
        (Frequency::Repeat, Some(settings)) => settings.initial_installment,
        _ => 1,
    }
}
