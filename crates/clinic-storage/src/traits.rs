//! Storage traits for the clinic storage abstraction layer.
//!
//! This module defines the contract that all storage backends must
//! implement: point-in-time CRUD over record collections, plus the
//! transactional primitives the payment engine builds on.

use async_trait::async_trait;
use serde_json::Value;

use clinic_core::RecordKind;

use crate::error::StorageError;
use crate::types::StoredRecord;

/// The main storage trait that all clinic storage backends must implement.
///
/// `get` and `list` return point-in-time snapshots. `create` assigns a new
/// unique identifier. `update` replaces the record's fields wholesale and
/// fails with `NotFound` for an absent id. `delete` is unconditional and
/// does not cascade. Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait ClinicStorage: Send + Sync {
    /// Reads a record by kind and id. Returns `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, not for missing
    /// records.
    async fn get(&self, kind: RecordKind, id: &str)
    -> Result<Option<StoredRecord>, StorageError>;

    /// Lists all records of a kind.
    async fn list(&self, kind: RecordKind) -> Result<Vec<StoredRecord>, StorageError>;

    /// Creates a new record with a generated id and returns it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidRecord` if `fields` is not a JSON
    /// object.
    async fn create(&self, kind: RecordKind, fields: &Value)
    -> Result<StoredRecord, StorageError>;

    /// Replaces an existing record's fields.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the id does not exist.
    async fn update(
        &self,
        kind: RecordKind,
        id: &str,
        fields: &Value,
    ) -> Result<StoredRecord, StorageError>;

    /// Deletes a record by kind and id.
    ///
    /// Deleting an absent record is an error; callers that want idempotent
    /// deletes check existence first.
    async fn delete(&self, kind: RecordKind, id: &str) -> Result<(), StorageError>;

    /// Begins a new transaction.
    ///
    /// The returned context joins every `read_for_update` into its read set
    /// and queues every `write` until commit; commit applies all queued
    /// writes atomically or fails with `WriteConflict` if any read record
    /// changed since it was read. Use [`crate::txn::with_transaction`]
    /// rather than driving the context by hand.
    async fn begin(&self) -> Result<Box<dyn TransactionContext>, StorageError>;

    /// Returns the name of this storage backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}

/// A single atomic unit of work against the store.
///
/// Reads observe a consistent snapshot (plus the transaction's own queued
/// writes); no write touches the store before `commit`. Dropping the
/// context without committing discards all queued writes.
#[async_trait]
pub trait TransactionContext: Send {
    /// Reads a record inside the transaction, joining it to the read set.
    ///
    /// Absence is also recorded: a record created concurrently after being
    /// read as absent conflicts at commit.
    async fn read_for_update(
        &mut self,
        kind: RecordKind,
        id: &str,
    ) -> Result<Option<StoredRecord>, StorageError>;

    /// Queues a full-field write, applied only at commit.
    fn write(&mut self, kind: RecordKind, id: &str, fields: Value);

    /// Validates the read set and applies all queued writes atomically.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::WriteConflict` if any record in the read set
    /// was modified by a concurrent commit; the caller must re-run the
    /// whole unit of work from its read phase.
    async fn commit(self: Box<Self>) -> Result<(), StorageError>;

    /// Discards all queued writes.
    async fn rollback(self: Box<Self>) -> Result<(), StorageError>;
}
