//! Merges stored edit records over expanded occurrences.

use std::collections::HashMap;

use cadence_shared::{EngineConfig, OverlayMatching};
use cadence_shared::types::WorkspaceId;
use tracing::{debug, warn};

use super::types::{EditRecord, InstallmentKey};
use crate::ledger::{BalanceCalculator, Frequency, LedgerError};
use crate::occurrence::Occurrence;
use crate::repository::EditRecordSource;

/// Looks up and applies per-occurrence overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct EditOverlayResolver {
    matching: OverlayMatching,
}

impl From<&EngineConfig> for EditOverlayResolver {
    fn from(config: &EngineConfig) -> Self {
        Self::new(config.overlay_matching)
    }
}

impl EditOverlayResolver {
    /// Creates a resolver matching edit records by `matching`.
    #[must_use]
    pub const fn new(matching: OverlayMatching) -> Self {
        Self { matching }
    }

    /// Matching rule in use.
    #[must_use]
    pub const fn matching(&self) -> OverlayMatching {
        self.matching
    }

    /// Key an edit record must carry to override `occurrence`.
    #[must_use]
    pub const fn key_for(&self, occurrence: &Occurrence) -> InstallmentKey {
        let installment = match self.matching {
            OverlayMatching::DisplaySequence => occurrence.installment,
            OverlayMatching::SchedulePosition => occurrence.schedule_position,
        };
        InstallmentKey::new(occurrence.id, installment)
    }

    /// Fetches the edit record stored under `key`, deleted or not.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Repository` if the fetch fails.
    pub async fn resolve(
        &self,
        source: &dyn EditRecordSource,
        workspace_id: WorkspaceId,
        key: InstallmentKey,
    ) -> Result<Option<EditRecord>, LedgerError> {
        let records = source
            .fetch_edit_records(workspace_id, std::slice::from_ref(&key))
            .await?;
        Ok(records.into_iter().find(|record| record.key() == key))
    }

    /// Merges `edit` over `occurrence`.
    ///
    /// Identity, frequency, repeat settings and installment bookkeeping stay
    /// with the occurrence, as does the balance of a NONE occurrence.
    /// Everything else comes from the edit payload.
    #[must_use]
    pub fn merge(occurrence: Occurrence, edit: &EditRecord) -> Occurrence {
        if let Some(settings) = &occurrence.repeat_settings
            && edit.installment > settings.count
        {
            warn!(
                template_id = %occurrence.id,
                installment = edit.installment,
                count = settings.count,
                "edit record beyond installment count"
            );
        }

        let payload = &edit.payload;
        let balance = match occurrence.frequency {
            Frequency::None => &occurrence.balance,
            Frequency::Recurring | Frequency::Repeat => &payload.balance,
        };
        let balance = BalanceCalculator::settle(balance, payload.transaction_type);

        Occurrence {
            name: payload.name.clone(),
            description: payload.description.clone(),
            balance,
            transaction_type: payload.transaction_type,
            due_date: payload.due_date,
            registration_date: payload.registration_date,
            is_confirmed: payload.is_confirmed,
            confirmation_date: payload.confirmation_date,
            account_id: payload.account_id,
            category_id: payload.category_id,
            subcategory_id: payload.subcategory_id,
            tag_ids: payload.tag_ids.clone(),
            main_template_id: None,
            edit_id: Some(edit.id),
            ..occurrence
        }
    }

    /// Applies `edits` to `occurrences`, dropping soft-deleted ones.
    #[must_use]
    pub fn apply(&self, occurrences: Vec<Occurrence>, edits: Vec<EditRecord>) -> Vec<Occurrence> {
        let by_key: HashMap<InstallmentKey, EditRecord> =
            edits.into_iter().map(|edit| (edit.key(), edit)).collect();

        occurrences
            .into_iter()
            .filter_map(|occurrence| match by_key.get(&self.key_for(&occurrence)) {
                Some(edit) if edit.is_deleted => {
                    debug!(
                        template_id = %occurrence.id,
                        installment = edit.installment,
                        "occurrence suppressed by deleted edit"
                    );
                    None
                }
                Some(edit) => Some(Self::merge(occurrence, edit)),
                None => Some(occurrence),
            })
            .collect()
    }

    /// Fetches the edit records for `occurrences` in one batch and applies them.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Repository` if the fetch fails.
    pub async fn resolve_all(
        &self,
        source: &dyn EditRecordSource,
        workspace_id: WorkspaceId,
        occurrences: Vec<Occurrence>,
    ) -> Result<Vec<Occurrence>, LedgerError> {
        if occurrences.is_empty() {
            return Ok(occurrences);
        }

        let mut keys: Vec<InstallmentKey> =
            occurrences.iter().map(|occurrence| self.key_for(occurrence)).collect();
        keys.sort_unstable();
        keys.dedup();

        let edits = source.fetch_edit_records(workspace_id, &keys).await?;
        Ok(self.apply(occurrences, edits))
    }
}
