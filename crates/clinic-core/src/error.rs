use thiserror::Error;

/// Core error types for clinic record operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid record kind: {0}")]
    InvalidRecordKind(String),

    #[error("Record not found: {kind}/{id}")]
    RecordNotFound { kind: String, id: String },

    #[error("Record conflict: {kind}/{id} already exists")]
    RecordConflict { kind: String, id: String },

    #[error("Invalid record data: {message}")]
    InvalidRecord { message: String },

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    /// Create a new InvalidRecordKind error
    pub fn invalid_record_kind(kind: impl Into<String>) -> Self {
        Self::InvalidRecordKind(kind.into())
    }

    /// Create a new RecordNotFound error
    pub fn record_not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::RecordNotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Create a new RecordConflict error
    pub fn record_conflict(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::RecordConflict {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Create a new InvalidRecord error
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }

    /// Create a new Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Check if this error is a client error (4xx category)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRecordKind(_)
                | Self::RecordNotFound { .. }
                | Self::RecordConflict { .. }
                | Self::InvalidRecord { .. }
                | Self::JsonError(_)
        )
    }

    /// Check if this error is a server error (5xx category)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CoreError::record_not_found("Bill", "b-1");
        assert_eq!(err.to_string(), "Record not found: Bill/b-1");

        let err = CoreError::record_conflict("Patient", "p-1");
        assert_eq!(err.to_string(), "Record conflict: Patient/p-1 already exists");
    }

    #[test]
    fn error_classification() {
        assert!(CoreError::record_not_found("Bill", "b-1").is_client_error());
        assert!(CoreError::invalid_record("bad").is_client_error());
        assert!(CoreError::configuration("missing").is_server_error());
        assert!(!CoreError::configuration("missing").is_client_error());
    }
}
