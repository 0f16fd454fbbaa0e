//! CRUD over one record kind, with normalization and mirror fan-out.

use serde_json::Value;

use clinic_core::{RecordKind, validate_id};
use clinic_storage::{DynMirror, DynStorage, StoredRecord};

use crate::error::RepoError;
use crate::normalize::normalize;

/// Repository for a single record kind.
///
/// Writes normalize the payload first (see [`crate::normalize`]), go to
/// the primary store, then fan out to the mirror sink. Mirror failures are
/// logged and swallowed; the primary store is the source of truth.
#[derive(Clone)]
pub struct RecordRepository {
    kind: RecordKind,
    storage: DynStorage,
    mirror: DynMirror,
}

impl RecordRepository {
    pub fn new(kind: RecordKind, storage: DynStorage, mirror: DynMirror) -> Self {
        Self {
            kind,
            storage,
            mirror,
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub async fn list(&self) -> Result<Vec<StoredRecord>, RepoError> {
        Ok(self.storage.list(self.kind).await?)
    }

    pub async fn get(&self, id: &str) -> Result<Option<StoredRecord>, RepoError> {
        self.check_id(id)?;
        Ok(self.storage.get(self.kind, id).await?)
    }

    #[tracing::instrument(skip(self, payload), fields(kind = %self.kind))]
    pub async fn create(&self, payload: &Value) -> Result<StoredRecord, RepoError> {
        let fields = normalize(self.kind, payload)?;
        let record = self.storage.create(self.kind, &fields).await?;
        self.mirror_upsert(&record).await;
        Ok(record)
    }

    /// Full-field replace; partial updates are not supported.
    #[tracing::instrument(skip(self, payload), fields(kind = %self.kind, id = %id))]
    pub async fn update(&self, id: &str, payload: &Value) -> Result<StoredRecord, RepoError> {
        self.check_id(id)?;
        let fields = normalize(self.kind, payload)?;
        let record = self.storage.update(self.kind, id, &fields).await?;
        self.mirror_upsert(&record).await;
        Ok(record)
    }

    /// Unconditional delete. Never cascades: records referencing the
    /// deleted id keep their dangling reference.
    #[tracing::instrument(skip(self), fields(kind = %self.kind, id = %id))]
    pub async fn delete(&self, id: &str) -> Result<(), RepoError> {
        self.check_id(id)?;
        self.storage.delete(self.kind, id).await?;
        if let Err(err) = self.mirror.record_deleted(self.kind, id).await {
            tracing::warn!(
                sink = self.mirror.sink_name(),
                kind = %self.kind,
                id = %id,
                error = %err,
                "mirror delete failed"
            );
        }
        Ok(())
    }

    fn check_id(&self, id: &str) -> Result<(), RepoError> {
        validate_id(id).map_err(|e| RepoError::validation(e.to_string()))
    }

    async fn mirror_upsert(&self, record: &StoredRecord) {
        if let Err(err) = self.mirror.record_upserted(self.kind, record).await {
            tracing::warn!(
                sink = self.mirror.sink_name(),
                kind = %self.kind,
                id = %record.id,
                error = %err,
                "mirror upsert failed"
            );
        }
    }
}
