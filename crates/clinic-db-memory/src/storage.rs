use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use papaya::HashMap as PapayaHashMap;
use serde_json::Value;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use clinic_core::RecordKind;
use clinic_storage::{
    ClinicStorage, StorageError, StoredRecord, TransactionContext, storage_key,
};

use crate::transaction::MemoryTransaction;

/// State shared between the storage handle and its open transactions.
pub(crate) struct Shared {
    /// Main storage using papaya for lock-free concurrent reads.
    pub(crate) data: PapayaHashMap<String, StoredRecord>,
    /// Atomic counter for per-record versions.
    pub(crate) version_counter: AtomicU64,
    /// Serializes commit validation+apply and single-record writes, so a
    /// transaction's read-set check cannot interleave with another write.
    pub(crate) commit_lock: Mutex<()>,
    /// Deployment namespace prepended to every key, e.g.
    /// `artifacts/{app_id}/public/data/`. Empty when unnamespaced.
    pub(crate) prefix: String,
}

impl Shared {
    pub(crate) fn next_version(&self) -> u64 {
        self.version_counter.fetch_add(1, Ordering::SeqCst)
    }

    pub(crate) fn key(&self, kind: RecordKind, id: &str) -> String {
        format!("{}{}", self.prefix, storage_key(kind, id))
    }
}

/// In-memory clinic storage backend using a papaya lock-free HashMap.
///
/// Single-record operations are last-write-wins. Multi-record units of
/// work go through [`ClinicStorage::begin`]: transactions validate their
/// read sets against per-record versions inside the commit critical
/// section, giving snapshot-style isolation with commit-time conflict
/// detection.
pub struct InMemoryStorage {
    pub(crate) shared: Arc<Shared>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::with_prefix(String::new())
    }

    /// A store whose keys live under the shared-deployment namespace
    /// `artifacts/{app_id}/public/data/`.
    pub fn with_app_id(app_id: &str) -> Self {
        Self::with_prefix(format!("artifacts/{app_id}/public/data/"))
    }

    fn with_prefix(prefix: String) -> Self {
        Self {
            shared: Arc::new(Shared {
                data: PapayaHashMap::new(),
                version_counter: AtomicU64::new(1),
                commit_lock: Mutex::new(()),
                prefix,
            }),
        }
    }

    /// Number of records across all kinds. Test helper.
    pub fn count(&self) -> usize {
        self.shared.data.pin().len()
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for InMemoryStorage {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Validates that `fields` is a JSON object and strips any embedded `id`
/// (the id lives on the record envelope, not in its fields).
pub(crate) fn sanitize_fields(kind: RecordKind, fields: &Value) -> Result<Value, StorageError> {
    let mut obj = fields
        .as_object()
        .cloned()
        .ok_or_else(|| StorageError::invalid_record(format!("{kind} fields must be a JSON object")))?;
    obj.remove("id");
    Ok(Value::Object(obj))
}

#[async_trait]
impl ClinicStorage for InMemoryStorage {
    async fn get(
        &self,
        kind: RecordKind,
        id: &str,
    ) -> Result<Option<StoredRecord>, StorageError> {
        let key = self.shared.key(kind, id);
        let guard = self.shared.data.pin();
        Ok(guard.get(&key).cloned())
    }

    async fn list(&self, kind: RecordKind) -> Result<Vec<StoredRecord>, StorageError> {
        let prefix = format!("{}{}/", self.shared.prefix, kind.collection());
        let guard = self.shared.data.pin();
        let mut records: Vec<StoredRecord> = guard
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(_, record)| record.clone())
            .collect();
        // Stable order for API responses
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }

    #[tracing::instrument(skip(self, fields), fields(kind = %kind))]
    async fn create(
        &self,
        kind: RecordKind,
        fields: &Value,
    ) -> Result<StoredRecord, StorageError> {
        let fields = sanitize_fields(kind, fields)?;
        let id = clinic_core::generate_id();
        let now = OffsetDateTime::now_utc();
        let record = StoredRecord {
            kind,
            id: id.clone(),
            version: self.shared.next_version(),
            fields,
            last_updated: now,
            created_at: now,
        };

        let _commit = self.shared.commit_lock.lock().await;
        let key = self.shared.key(kind, &id);
        let guard = self.shared.data.pin();
        if guard.get(&key).is_some() {
            // uuid collision; effectively unreachable
            return Err(StorageError::already_exists(kind.to_string(), id));
        }
        guard.insert(key, record.clone());
        Ok(record)
    }

    #[tracing::instrument(skip(self, fields), fields(kind = %kind, id = %id))]
    async fn update(
        &self,
        kind: RecordKind,
        id: &str,
        fields: &Value,
    ) -> Result<StoredRecord, StorageError> {
        let fields = sanitize_fields(kind, fields)?;
        let key = self.shared.key(kind, id);

        let _commit = self.shared.commit_lock.lock().await;
        let guard = self.shared.data.pin();
        let existing = guard
            .get(&key)
            .ok_or_else(|| StorageError::not_found(kind.to_string(), id))?;

        let record = StoredRecord {
            kind,
            id: id.to_string(),
            version: self.shared.next_version(),
            fields,
            last_updated: OffsetDateTime::now_utc(),
            created_at: existing.created_at,
        };
        guard.insert(key, record.clone());
        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(kind = %kind, id = %id))]
    async fn delete(&self, kind: RecordKind, id: &str) -> Result<(), StorageError> {
        let key = self.shared.key(kind, id);

        let _commit = self.shared.commit_lock.lock().await;
        let guard = self.shared.data.pin();
        guard
            .remove(&key)
            .ok_or_else(|| StorageError::not_found(kind.to_string(), id))?;
        Ok(())
    }

    async fn begin(&self) -> Result<Box<dyn TransactionContext>, StorageError> {
        Ok(Box::new(MemoryTransaction::new(Arc::clone(&self.shared))))
    }

    fn backend_name(&self) -> &'static str {
        "in-memory-papaya"
    }
}
