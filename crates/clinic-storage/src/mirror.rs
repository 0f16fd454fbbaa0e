//! Best-effort relational mirror sink.
//!
//! The mirror keeps a secondary copy of every committed record (one table
//! per kind). It is write-only and never the source of truth: callers log
//! mirror failures and carry on.

use async_trait::async_trait;

use clinic_core::RecordKind;

use crate::error::StorageError;
use crate::types::StoredRecord;

/// A secondary sink that receives every committed write.
#[async_trait]
pub trait MirrorSink: Send + Sync {
    /// Called after a record is created or updated in the primary store.
    async fn record_upserted(
        &self,
        kind: RecordKind,
        record: &StoredRecord,
    ) -> Result<(), StorageError>;

    /// Called after a record is deleted from the primary store.
    async fn record_deleted(&self, kind: RecordKind, id: &str) -> Result<(), StorageError>;

    /// Returns the name of this sink for logging/debugging.
    fn sink_name(&self) -> &'static str;
}

/// Mirror sink that drops everything. Used when no mirror is configured.
#[derive(Debug, Default)]
pub struct NoopMirror;

#[async_trait]
impl MirrorSink for NoopMirror {
    async fn record_upserted(
        &self,
        _kind: RecordKind,
        _record: &StoredRecord,
    ) -> Result<(), StorageError> {
        Ok(())
    }

    async fn record_deleted(&self, _kind: RecordKind, _id: &str) -> Result<(), StorageError> {
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "noop"
    }
}
