//! Optimistic transactions over the in-memory store.
//!
//! A transaction records the version (or absence) of every record it reads
//! and queues its writes. Commit takes the store's commit lock, re-checks
//! the whole read set against current versions, and either applies every
//! queued write or fails with `WriteConflict` without touching anything.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use time::OffsetDateTime;

use clinic_core::RecordKind;
use clinic_storage::{StorageError, StoredRecord, TransactionContext};

use crate::storage::{Shared, sanitize_fields};

struct PendingWrite {
    kind: RecordKind,
    id: String,
    fields: Value,
}

pub struct MemoryTransaction {
    shared: Arc<Shared>,
    /// Version observed per key; `None` means the record was absent.
    reads: HashMap<String, Option<u64>>,
    /// Queued writes in issue order. Later writes to the same key win.
    writes: Vec<PendingWrite>,
}

impl MemoryTransaction {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            reads: HashMap::new(),
            writes: Vec::new(),
        }
    }

    /// The latest queued fields for a key, if any (read-your-writes).
    fn pending_fields(&self, key: &str) -> Option<&Value> {
        self.writes
            .iter()
            .rev()
            .find(|w| self.shared.key(w.kind, &w.id) == key)
            .map(|w| &w.fields)
    }
}

#[async_trait]
impl TransactionContext for MemoryTransaction {
    async fn read_for_update(
        &mut self,
        kind: RecordKind,
        id: &str,
    ) -> Result<Option<StoredRecord>, StorageError> {
        let key = self.shared.key(kind, id);

        let base = {
            let guard = self.shared.data.pin();
            guard.get(&key).cloned()
        };

        // First read of a key pins its version into the read set; repeat
        // reads keep the originally observed version.
        self.reads
            .entry(key.clone())
            .or_insert_with(|| base.as_ref().map(|r| r.version));

        // Overlay this transaction's own queued writes.
        if let Some(fields) = self.pending_fields(&key) {
            let now = OffsetDateTime::now_utc();
            return Ok(Some(StoredRecord {
                kind,
                id: id.to_string(),
                version: base.as_ref().map(|r| r.version).unwrap_or_default(),
                fields: fields.clone(),
                last_updated: now,
                created_at: base.as_ref().map(|r| r.created_at).unwrap_or(now),
            }));
        }

        Ok(base)
    }

    fn write(&mut self, kind: RecordKind, id: &str, fields: Value) {
        self.writes.push(PendingWrite {
            kind,
            id: id.to_string(),
            fields,
        });
    }

    async fn commit(self: Box<Self>) -> Result<(), StorageError> {
        // Validate fields before taking the lock; a malformed write aborts
        // the whole unit with nothing applied.
        let mut sanitized = Vec::with_capacity(self.writes.len());
        for w in &self.writes {
            sanitized.push((w.kind, w.id.clone(), sanitize_fields(w.kind, &w.fields)?));
        }

        let _commit = self.shared.commit_lock.lock().await;
        let guard = self.shared.data.pin();

        // Read-set validation: every record read must be unchanged,
        // including ones read as absent.
        for (key, observed) in &self.reads {
            let current = guard.get(key).map(|r| r.version);
            if current != *observed {
                return Err(StorageError::write_conflict(key.clone()));
            }
        }

        // Apply all queued writes.
        let now = OffsetDateTime::now_utc();
        for (kind, id, fields) in sanitized {
            let key = self.shared.key(kind, &id);
            let created_at = guard.get(&key).map(|r| r.created_at).unwrap_or(now);
            let record = StoredRecord {
                kind,
                id,
                version: self.shared.next_version(),
                fields,
                last_updated: now,
                created_at,
            };
            guard.insert(key, record);
        }

        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StorageError> {
        // Nothing was applied; dropping the queued writes is enough.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;
    use clinic_storage::ClinicStorage;
    use serde_json::json;

    async fn seed_item(storage: &InMemoryStorage, quantity: u32) -> String {
        storage
            .create(
                RecordKind::InventoryItem,
                &json!({"item": "Bandage", "quantity": quantity, "supplier": "Acme"}),
            )
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn commit_applies_all_queued_writes() {
        let storage = InMemoryStorage::new();
        let id = seed_item(&storage, 10).await;

        let mut txn = storage.begin().await.unwrap();
        let record = txn
            .read_for_update(RecordKind::InventoryItem, &id)
            .await
            .unwrap()
            .expect("present");
        assert_eq!(record.fields["quantity"], 10);

        txn.write(
            RecordKind::InventoryItem,
            &id,
            json!({"item": "Bandage", "quantity": 7, "supplier": "Acme"}),
        );
        txn.commit().await.unwrap();

        let after = storage
            .get(RecordKind::InventoryItem, &id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.fields["quantity"], 7);
    }

    #[tokio::test]
    async fn rollback_discards_queued_writes() {
        let storage = InMemoryStorage::new();
        let id = seed_item(&storage, 10).await;

        let mut txn = storage.begin().await.unwrap();
        txn.read_for_update(RecordKind::InventoryItem, &id)
            .await
            .unwrap();
        txn.write(RecordKind::InventoryItem, &id, json!({"item": "Bandage", "quantity": 0}));
        txn.rollback().await.unwrap();

        let after = storage
            .get(RecordKind::InventoryItem, &id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.fields["quantity"], 10);
    }

    #[tokio::test]
    async fn concurrent_write_invalidates_read_set() {
        let storage = InMemoryStorage::new();
        let id = seed_item(&storage, 10).await;

        let mut txn = storage.begin().await.unwrap();
        txn.read_for_update(RecordKind::InventoryItem, &id)
            .await
            .unwrap();
        txn.write(RecordKind::InventoryItem, &id, json!({"item": "Bandage", "quantity": 7}));

        // A competing single-record update lands before the commit.
        storage
            .update(
                RecordKind::InventoryItem,
                &id,
                &json!({"item": "Bandage", "quantity": 4}),
            )
            .await
            .unwrap();

        let err = txn.commit().await.unwrap_err();
        assert!(err.is_write_conflict());

        // The conflicting commit left the competing update in place.
        let after = storage
            .get(RecordKind::InventoryItem, &id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.fields["quantity"], 4);
    }

    #[tokio::test]
    async fn absent_read_conflicts_with_concurrent_create() {
        let storage = InMemoryStorage::new();

        let mut txn = storage.begin().await.unwrap();
        // Read a key that does not exist yet: absence joins the read set.
        let read = txn
            .read_for_update(RecordKind::Bill, "ghost-bill")
            .await
            .unwrap();
        assert!(read.is_none());

        // A competing transaction creates the record under that key.
        let mut other = storage.begin().await.unwrap();
        other.write(RecordKind::Bill, "ghost-bill", json!({"patient": "p-1", "status": "Pending"}));
        other.commit().await.unwrap();

        txn.write(RecordKind::Bill, "ghost-bill", json!({"patient": "p-2"}));
        let err = txn.commit().await.unwrap_err();
        assert!(err.is_write_conflict());
    }

    #[tokio::test]
    async fn read_your_own_queued_write() {
        let storage = InMemoryStorage::new();
        let id = seed_item(&storage, 10).await;

        let mut txn = storage.begin().await.unwrap();
        txn.read_for_update(RecordKind::InventoryItem, &id)
            .await
            .unwrap();
        txn.write(RecordKind::InventoryItem, &id, json!({"item": "Bandage", "quantity": 3}));

        let reread = txn
            .read_for_update(RecordKind::InventoryItem, &id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reread.fields["quantity"], 3);

        txn.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn conflicting_commits_serialize_to_one_winner() {
        let storage = InMemoryStorage::new();
        let id = seed_item(&storage, 8).await;

        let mut a = storage.begin().await.unwrap();
        let mut b = storage.begin().await.unwrap();
        a.read_for_update(RecordKind::InventoryItem, &id).await.unwrap();
        b.read_for_update(RecordKind::InventoryItem, &id).await.unwrap();
        a.write(RecordKind::InventoryItem, &id, json!({"item": "Bandage", "quantity": 3}));
        b.write(RecordKind::InventoryItem, &id, json!({"item": "Bandage", "quantity": 3}));

        let (ra, rb) = tokio::join!(a.commit(), b.commit());
        let outcomes = [ra.is_ok(), rb.is_ok()];
        assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
        assert!(
            [ra, rb]
                .into_iter()
                .filter_map(|r| r.err())
                .all(|e| e.is_write_conflict())
        );
    }
}
