//! Listing and balance aggregation over a template store.
//!
//! Every request recomputes from the store: templates are fetched, expanded,
//! overlaid with their edit records, then folded.

use std::collections::BTreeMap;
use std::sync::Arc;

use cadence_shared::EngineConfig;
use cadence_shared::types::WorkspaceId;
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use super::types::{BalanceSplit, OwnerBalance, OwnerKey};
use crate::ledger::{Frequency, LedgerError, OwnerFilter, OwnerKind, Transaction};
use crate::occurrence::{Occurrence, OccurrenceExpander, Window};
use crate::overlay::EditOverlayResolver;
use crate::repository::{EditRecordSource, TemplateSource};

/// Sums occurrences per owner, skipping those dated at or after `end`.
#[must_use]
pub fn fold_balances(
    occurrences: &[Occurrence],
    kind: OwnerKind,
    end: Option<DateTime<Utc>>,
) -> BTreeMap<OwnerKey, BalanceSplit> {
    let mut splits: BTreeMap<OwnerKey, BalanceSplit> = BTreeMap::new();
    for occurrence in occurrences {
        if end.is_some_and(|end| occurrence.reference_date() >= end) {
            continue;
        }
        let Some(owner) = occurrence.owner_id(kind) else {
            continue;
        };
        splits.entry(owner).or_default().add(occurrence);
    }
    splits
}

/// Read-side entry point of the engine.
pub struct LedgerService<S> {
    store: Arc<S>,
    expander: OccurrenceExpander,
    resolver: EditOverlayResolver,
}

impl<S> LedgerService<S>
where
    S: TemplateSource + EditRecordSource + 'static,
{
    /// Creates a service over `store`.
    #[must_use]
    pub fn new(store: Arc<S>, config: &EngineConfig) -> Self {
        Self {
            store,
            expander: OccurrenceExpander::from(config),
            resolver: EditOverlayResolver::from(config),
        }
    }

    /// Occurrences of the selected owners inside `window`, with edits applied
    /// and deleted occurrences removed, ordered by due date then template id.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Repository` if a fetch fails, or a data-integrity
    /// error if a template is malformed.
    #[instrument(skip(self, owners), fields(%workspace_id, kind = ?owners.kind))]
    pub async fn list_window(
        &self,
        workspace_id: WorkspaceId,
        owners: &OwnerFilter,
        window: Window,
    ) -> Result<Vec<Occurrence>, LedgerError> {
        let templates = self
            .store
            .fetch_templates(workspace_id, owners, None)
            .await?;
        let template_count = templates.len();
        let mut occurrences = self.materialize(workspace_id, templates, window).await?;
        occurrences.sort_by(|a, b| {
            a.due_date
                .cmp(&b.due_date)
                .then_with(|| a.id.cmp(&b.id))
                .then_with(|| a.installment.cmp(&b.installment))
        });

        info!(
            templates = template_count,
            occurrences = occurrences.len(),
            "window listed"
        );
        Ok(occurrences)
    }

    /// Balances of the selected owners as of the end of `month`/`year`.
    ///
    /// Every requested owner id is present in the result. The three frequency
    /// groups are fetched concurrently and the first failure aborts the call.
    ///
    /// # Errors
    ///
    /// - `InvalidPeriod` if `month` is not 1-12
    /// - `Repository` if a fetch fails
    /// - a data-integrity error if a template is malformed
    #[instrument(skip(self, owners), fields(%workspace_id, kind = ?owners.kind))]
    pub async fn aggregate(
        &self,
        workspace_id: WorkspaceId,
        owners: &OwnerFilter,
        year: i32,
        month: u32,
    ) -> Result<BTreeMap<OwnerKey, OwnerBalance>, LedgerError> {
        let window = Window::through_month(year, month)
            .map_err(|_| LedgerError::InvalidPeriod { year, month })?;

        let (single, recurring, repeat) = tokio::try_join!(
            self.store
                .fetch_templates(workspace_id, owners, Some(Frequency::None)),
            self.store
                .fetch_templates(workspace_id, owners, Some(Frequency::Recurring)),
            self.store
                .fetch_templates(workspace_id, owners, Some(Frequency::Repeat)),
        )?;

        let mut balances: BTreeMap<OwnerKey, OwnerBalance> = owners
            .ids
            .iter()
            .map(|id| (*id, OwnerBalance::default()))
            .collect();

        for (frequency, templates) in [
            (Frequency::None, single),
            (Frequency::Recurring, recurring),
            (Frequency::Repeat, repeat),
        ] {
            let template_count = templates.len();
            let occurrences = self.materialize(workspace_id, templates, window).await?;
            debug!(
                %frequency,
                templates = template_count,
                occurrences = occurrences.len(),
                "frequency group resolved"
            );
            for (owner, split) in fold_balances(&occurrences, owners.kind, window.end) {
                if owners.ids.is_empty() || owners.ids.contains(&owner) {
                    balances.entry(owner).or_default().add(frequency, split);
                }
            }
        }

        info!(owners = balances.len(), "balances aggregated");
        Ok(balances)
    }

    /// Expands on the blocking pool, since `expand_all` is CPU-bound rayon
    /// work, then overlays edit records.
    async fn materialize(
        &self,
        workspace_id: WorkspaceId,
        templates: Vec<Transaction>,
        window: Window,
    ) -> Result<Vec<Occurrence>, LedgerError> {
        let expander = self.expander;
        let occurrences =
            tokio::task::spawn_blocking(move || expander.expand_all(&templates, window))
                .await
                .map_err(|err| LedgerError::ExpansionTask(err.to_string()))??;
        self.resolver
            .resolve_all(&*self.store, workspace_id, occurrences)
            .await
    }
}
