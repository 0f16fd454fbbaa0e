//! Shared types for the storage abstraction layer.

use clinic_core::RecordKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::error::StorageError;

/// A record as persisted by a storage backend: the caller-visible fields
/// plus bookkeeping the backend maintains (version, timestamps).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub kind: RecordKind,
    pub id: String,
    /// Monotonic per-record version, bumped on every committed write.
    /// Transactions validate their read sets against it at commit time.
    pub version: u64,
    /// The record's fields as a JSON object. Does not include `id`.
    pub fields: Value,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl StoredRecord {
    /// The storage key for this record, `{collection}/{id}`.
    pub fn key(&self) -> String {
        format!("{}/{}", self.kind.collection(), self.id)
    }

    /// Decodes the fields into a typed model, injecting the record id.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StorageError> {
        let mut fields = self.fields.clone();
        if let Some(obj) = fields.as_object_mut() {
            obj.insert("id".to_string(), Value::String(self.id.clone()));
        }
        serde_json::from_value(fields).map_err(|e| {
            StorageError::invalid_record(format!(
                "cannot decode {}/{}: {e}",
                self.kind, self.id
            ))
        })
    }

    /// The fields with the record id injected, as returned to API clients.
    pub fn to_api_value(&self) -> Value {
        let mut fields = self.fields.clone();
        if let Some(obj) = fields.as_object_mut() {
            obj.insert("id".to_string(), Value::String(self.id.clone()));
        }
        fields
    }
}

/// Builds a storage key from a kind and id.
pub fn storage_key(kind: RecordKind, id: &str) -> String {
    format!("{}/{}", kind.collection(), id)
}
