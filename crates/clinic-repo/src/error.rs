use thiserror::Error;

use clinic_storage::StorageError;

/// Errors surfaced by the record repositories.
#[derive(Debug, Error)]
pub enum RepoError {
    /// The payload is structurally unusable (non-object, missing required
    /// fields). Rejected before anything reaches storage.
    #[error("Invalid payload: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl RepoError {
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_not_found())
    }
}
