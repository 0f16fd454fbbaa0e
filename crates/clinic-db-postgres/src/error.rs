//! Error types for the PostgreSQL mirror.

use clinic_storage::StorageError;

/// Errors specific to the PostgreSQL mirror.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    /// Database connection error.
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx_core::error::Error),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A record could not be shaped for its mirror table.
    #[error("Mirror encoding error: {message}")]
    Encoding { message: String },
}

impl PostgresError {
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }
}

impl From<PostgresError> for StorageError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::Connection(e) => StorageError::connection_error(e.to_string()),
            PostgresError::Config { message } => {
                StorageError::internal(format!("Configuration error: {message}"))
            }
            PostgresError::Encoding { message } => StorageError::invalid_record(message),
        }
    }
}

/// Result type alias for mirror operations.
pub type Result<T> = std::result::Result<T, PostgresError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_to_storage_error() {
        let err: StorageError = PostgresError::config("bad url").into();
        assert!(matches!(err, StorageError::Internal { .. }));

        let err: StorageError = PostgresError::encoding("not an object").into();
        assert!(matches!(err, StorageError::InvalidRecord { .. }));
    }
}
