//! Persistence collaborator error types.

use thiserror::Error;

/// Result type alias using `RepositoryError`.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Failures reported by a persistence collaborator.
///
/// The engine never retries; these are surfaced to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The store could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected or failed the query.
    #[error("Query failed: {0}")]
    Query(String),

    /// A stored row could not be mapped onto a domain type.
    #[error("Decode failed: {0}")]
    Decode(String),
}
