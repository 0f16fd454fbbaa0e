//! Storage error types for the clinic storage abstraction layer.

use std::fmt;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested record was not found.
    #[error("Record not found: {kind}/{id}")]
    NotFound {
        /// The kind of record that was not found.
        kind: String,
        /// The id of the record that was not found.
        id: String,
    },

    /// Attempted to create a record that already exists.
    #[error("Record already exists: {kind}/{id}")]
    AlreadyExists { kind: String, id: String },

    /// A concurrent transaction committed a conflicting write.
    ///
    /// The transaction's read set is stale; the whole unit of work must be
    /// re-run from its read phase.
    #[error("Write conflict on {key}")]
    WriteConflict {
        /// Storage key ("kind/id") of the record that changed underneath us.
        key: String,
    },

    /// The record data is invalid.
    #[error("Invalid record: {message}")]
    InvalidRecord { message: String },

    /// An error occurred during a transaction (begin, commit, or retry
    /// exhaustion).
    #[error("Transaction error: {message}")]
    TransactionError { message: String },

    /// Failed to reach the storage backend.
    #[error("Connection error: {message}")]
    ConnectionError { message: String },

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl StorageError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Creates a new `AlreadyExists` error.
    #[must_use]
    pub fn already_exists(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Creates a new `WriteConflict` error.
    #[must_use]
    pub fn write_conflict(key: impl Into<String>) -> Self {
        Self::WriteConflict { key: key.into() }
    }

    /// Creates a new `InvalidRecord` error.
    #[must_use]
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }

    /// Creates a new `TransactionError` error.
    #[must_use]
    pub fn transaction_error(message: impl Into<String>) -> Self {
        Self::TransactionError {
            message: message.into(),
        }
    }

    /// Creates a new `ConnectionError` error.
    #[must_use]
    pub fn connection_error(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is a write conflict error.
    #[must_use]
    pub fn is_write_conflict(&self) -> bool {
        matches!(self, Self::WriteConflict { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::AlreadyExists { .. } | Self::WriteConflict { .. } => ErrorCategory::Conflict,
            Self::InvalidRecord { .. } => ErrorCategory::Validation,
            Self::TransactionError { .. } => ErrorCategory::Transaction,
            Self::ConnectionError { .. } => ErrorCategory::Infrastructure,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of storage errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    NotFound,
    Conflict,
    Validation,
    Transaction,
    Infrastructure,
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Validation => write!(f, "validation"),
            Self::Transaction => write!(f, "transaction"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StorageError::not_found("Bill", "b-123");
        assert_eq!(err.to_string(), "Record not found: Bill/b-123");

        let err = StorageError::write_conflict("inventory/bandage-1");
        assert_eq!(err.to_string(), "Write conflict on inventory/bandage-1");
    }

    #[test]
    fn error_predicates() {
        assert!(StorageError::not_found("Bill", "b-1").is_not_found());
        assert!(!StorageError::not_found("Bill", "b-1").is_write_conflict());
        assert!(StorageError::write_conflict("k").is_write_conflict());
    }

    #[test]
    fn error_category() {
        assert_eq!(
            StorageError::write_conflict("k").category(),
            ErrorCategory::Conflict
        );
        assert_eq!(
            StorageError::invalid_record("bad").category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            StorageError::connection_error("down").category(),
            ErrorCategory::Infrastructure
        );
    }
}
