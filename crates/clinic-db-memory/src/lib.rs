//! In-memory storage backend for the clinic server.
//!
//! This crate provides an in-memory implementation of the `ClinicStorage`
//! trait from `clinic-storage`, using a papaya lock-free HashMap for
//! concurrent access and optimistic, version-validated transactions.
//!
//! # Example
//!
//! ```ignore
//! use clinic_db_memory::InMemoryStorage;
//! use clinic_core::RecordKind;
//! use clinic_storage::ClinicStorage;
//!
//! let storage = InMemoryStorage::new();
//! let patient = serde_json::json!({"name": "Ada Lovelace", "contact": "x"});
//! let created = storage.create(RecordKind::Patient, &patient).await?;
//! ```

pub mod storage;
pub mod transaction;

pub use storage::InMemoryStorage;
pub use transaction::MemoryTransaction;

// Re-export the storage traits for convenience
pub use clinic_storage::{ClinicStorage, StorageError, StoredRecord};

/// Creates a new in-memory storage handle ready for sharing.
pub fn create_storage() -> clinic_storage::DynStorage {
    std::sync::Arc::new(InMemoryStorage::new())
}

/// Creates an in-memory storage handle namespaced to a deployment app id.
pub fn create_storage_with_app_id(app_id: &str) -> clinic_storage::DynStorage {
    std::sync::Arc::new(InMemoryStorage::with_app_id(app_id))
}
