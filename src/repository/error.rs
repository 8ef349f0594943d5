use thiserror::Error;

use crate::lock::LockError;

/// Storage-level failures. Surfaced to callers as
/// [`CrudError::Repository`](crate::error::CrudError::Repository).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("repository lock poisoned during {0}")]
    LockPoisoned(&'static str),

    /// The entity has no identifier and the repository cannot assign one.
    #[error("cannot save {resource_type} without an identifier")]
    MissingId { resource_type: &'static str },

    #[error(transparent)]
    Lock(#[from] LockError),

    /// Backend-specific failure.
    #[error("storage error: {0}")]
    Storage(String),
}
