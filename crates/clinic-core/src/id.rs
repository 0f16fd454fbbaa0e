use uuid::Uuid;

/// Generates a new opaque record identifier.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Validates a caller-supplied record identifier.
///
/// Ids are opaque but must be non-empty and free of path separators so
/// they can appear in storage keys and URLs.
pub fn validate_id(id: &str) -> crate::error::Result<()> {
    if id.is_empty() {
        return Err(crate::error::CoreError::invalid_record("empty record id"));
    }
    if id.contains('/') || id.chars().any(char::is_whitespace) {
        return Err(crate::error::CoreError::invalid_record(format!(
            "invalid record id: {id:?}"
        )));
    }
    Ok(())
}
