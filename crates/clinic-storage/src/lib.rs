//! Storage abstraction layer for the clinic backend.
//!
//! Defines the [`ClinicStorage`] trait backends implement, the
//! [`TransactionContext`] primitives the payment engine builds on, the
//! [`with_transaction`] retry driver, and the best-effort [`MirrorSink`]
//! seam for the optional relational mirror.

pub mod error;
pub mod mirror;
pub mod traits;
pub mod txn;
pub mod types;

pub use error::{ErrorCategory, StorageError};
pub use mirror::{MirrorSink, NoopMirror};
pub use traits::{ClinicStorage, TransactionContext};
pub use txn::{MAX_TXN_ATTEMPTS, with_transaction};
pub use types::{StoredRecord, storage_key};

/// Type alias for a shareable storage handle.
pub type DynStorage = std::sync::Arc<dyn ClinicStorage>;

/// Type alias for a shareable mirror sink.
pub type DynMirror = std::sync::Arc<dyn MirrorSink>;
