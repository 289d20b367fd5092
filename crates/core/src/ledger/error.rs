//! Ledger engine error types.
//!
//! Covers data-integrity faults in templates, calendar failures, lookups that
//! found nothing, and failures of the persistence collaborator.

use cadence_shared::AppError;
use cadence_shared::types::TransactionId;
use thiserror::Error;
use uuid::Uuid;

use crate::repository::{EntityKind, RepositoryError};
use crate::schedule::ScheduleError;

/// Errors that can occur while expanding, resolving, or aggregating.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Data Integrity Errors ==========
    /// Template violates an invariant the expander relies on.
    #[error("Malformed template {id}: {reason}")]
    MalformedTemplate {
        /// The offending template.
        id: TransactionId,
        /// What is wrong with it.
        reason: String,
    },

    /// Frequency tag is not one of NONE, RECURRING, REPEAT.
    #[error("Unknown frequency: {0}")]
    UnknownFrequency(String),

    /// Calendar arithmetic failed.
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    // ========== Lookup Errors ==========
    /// Template does not exist in the workspace.
    #[error("Template not found: {0}")]
    TemplateNotFound(TransactionId),

    /// Referenced entity does not exist in the workspace.
    #[error("{kind} not found: {id}")]
    ReferenceNotFound {
        /// Kind of entity.
        kind: EntityKind,
        /// Missing id.
        id: Uuid,
    },

    // ========== Request Errors ==========
    /// Reporting period does not name a calendar month.
    #[error("Invalid reporting period: {year}-{month}")]
    InvalidPeriod {
        /// Requested year.
        year: i32,
        /// Requested month.
        month: u32,
    },

    /// Installment is outside the template's schedule.
    #[error("Template {template_id} has no installment {installment}")]
    InvalidInstallment {
        /// The template addressed.
        template_id: TransactionId,
        /// Requested installment.
        installment: u32,
    },

    // ========== Collaborator Errors ==========
    /// Persistence collaborator failed.
    #[error("Data retrieval failed: {0}")]
    Repository(#[from] RepositoryError),

    // ========== Runtime Errors ==========
    /// The blocking expansion task panicked or was cancelled.
    #[error("Expansion task failed: {0}")]
    ExpansionTask(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedTemplate { .. } => "MALFORMED_TEMPLATE",
            Self::UnknownFrequency(_) => "UNKNOWN_FREQUENCY",
            Self::Schedule(_) => "SCHEDULE_ERROR",
            Self::TemplateNotFound(_) => "TEMPLATE_NOT_FOUND",
            Self::ReferenceNotFound { .. } => "REFERENCE_NOT_FOUND",
            Self::InvalidPeriod { .. } => "INVALID_PERIOD",
            Self::InvalidInstallment { .. } => "INVALID_INSTALLMENT",
            Self::Repository(_) => "DATA_RETRIEVAL_ERROR",
            Self::ExpansionTask(_) => "EXPANSION_TASK_FAILED",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidPeriod { .. } | Self::InvalidInstallment { .. } => 400,
            Self::TemplateNotFound(_) | Self::ReferenceNotFound { .. } => 404,
            Self::MalformedTemplate { .. } | Self::UnknownFrequency(_) | Self::Schedule(_) => 422,
            Self::Repository(_) => 503,
            Self::ExpansionTask(_) => 500,
        }
    }

    /// Shorthand for a [`LedgerError::MalformedTemplate`].
    pub(crate) fn malformed(id: TransactionId, reason: impl Into<String>) -> Self {
        Self::MalformedTemplate {
            id,
            reason: reason.into(),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::MalformedTemplate { .. }
            | LedgerError::UnknownFrequency(_)
            | LedgerError::Schedule(_) => Self::DataIntegrity(message),
            LedgerError::TemplateNotFound(_) | LedgerError::ReferenceNotFound { .. } => {
                Self::NotFound(message)
            }
            LedgerError::InvalidPeriod { .. } | LedgerError::InvalidInstallment { .. } => {
                Self::Validation(message)
            }
            LedgerError::Repository(_) => Self::DataRetrieval(message),
            LedgerError::ExpansionTask(_) => Self::Internal(message),
        }
    }
}
