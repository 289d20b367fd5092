//! Existence checks for entities referenced by an edit.

use std::sync::Arc;

use cadence_shared::types::WorkspaceId;
use futures::future::try_join_all;
use tracing::debug;

use crate::ledger::LedgerError;
use crate::repository::{EntityDirectory, EntityRef};

/// Verifies that referenced entities exist, checking them concurrently.
#[derive(Clone)]
pub struct ReferenceValidator {
    directory: Arc<dyn EntityDirectory>,
}

impl ReferenceValidator {
    /// Creates a validator backed by `directory`.
    #[must_use]
    pub fn new(directory: Arc<dyn EntityDirectory>) -> Self {
        Self { directory }
    }

    /// Succeeds if every entity in `refs` exists in the workspace.
    ///
    /// The first missing entity or failed lookup aborts the remaining checks.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::ReferenceNotFound` for a missing entity, or
    /// `LedgerError::Repository` if a lookup fails.
    pub async fn validate(
        &self,
        workspace_id: WorkspaceId,
        refs: &[EntityRef],
    ) -> Result<(), LedgerError> {
        if refs.is_empty() {
            return Ok(());
        }

        let checks = refs.iter().map(|entity| {
            let directory = Arc::clone(&self.directory);
            let entity = *entity;
            async move {
                if directory.exists(workspace_id, entity).await? {
                    Ok(())
                } else {
                    Err(LedgerError::ReferenceNotFound {
                        kind: entity.kind,
                        id: entity.id,
                    })
                }
            }
        });
        try_join_all(checks).await?;

        debug!(%workspace_id, checked = refs.len(), "references validated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{EntityKind, MockEntityDirectory, RepositoryError};
    use uuid::Uuid;

    fn account(id: Uuid) -> EntityRef {
        EntityRef::new(EntityKind::Account, id)
    }

    #[tokio::test]
    async fn test_all_present() {
        let mut directory = MockEntityDirectory::new();
        directory.expect_exists().times(3).returning(|_, _| Ok(true));
        let validator = ReferenceValidator::new(Arc::new(directory));

        let refs = [
            account(Uuid::now_v7()),
            EntityRef::new(EntityKind::Category, Uuid::now_v7()),
            EntityRef::new(EntityKind::Tag, Uuid::now_v7()),
        ];
        validator.validate(WorkspaceId::new(), &refs).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_refs_skip_lookups() {
        let mut directory = MockEntityDirectory::new();
        directory.expect_exists().never();
        let validator = ReferenceValidator::new(Arc::new(directory));

        validator.validate(WorkspaceId::new(), &[]).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_entity_is_reported() {
        let missing = Uuid::now_v7();
        let mut directory = MockEntityDirectory::new();
        directory
            .expect_exists()
            .returning(move |_, entity| Ok(entity.id != missing));
        let validator = ReferenceValidator::new(Arc::new(directory));

        let refs = [
            account(Uuid::now_v7()),
            EntityRef::new(EntityKind::Subcategory, missing),
        ];
        let err = validator
            .validate(WorkspaceId::new(), &refs)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::ReferenceNotFound { kind: EntityKind::Subcategory, id } if id == missing
        ));
    }

    #[tokio::test]
    async fn test_lookup_failure_propagates() {
        let mut directory = MockEntityDirectory::new();
        directory
            .expect_exists()
            .returning(|_, _| Err(RepositoryError::Unavailable("directory down".into())));
        let validator = ReferenceValidator::new(Arc::new(directory));

        let err = validator
            .validate(WorkspaceId::new(), &[account(Uuid::now_v7())])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Repository(RepositoryError::Unavailable(_))
        ));
    }
}
