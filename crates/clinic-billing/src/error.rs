//! Payment failure taxonomy.

use thiserror::Error;

use clinic_storage::StorageError;

/// Everything that can go wrong while paying a bill.
///
/// The first five variants are domain rejections the caller can act on;
/// `Storage` wraps infrastructure failures, including a transaction that
/// kept conflicting past its retry budget.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Bill not found: {0}")]
    BillNotFound(String),

    #[error("Bill {0} is already paid")]
    AlreadyPaid(String),

    #[error("Inventory item not found: {name}")]
    InventoryItemNotFound { name: String },

    #[error("Insufficient stock for {item}: requested {requested}, available {available}")]
    InsufficientStock {
        item: String,
        requested: u32,
        available: u32,
    },

    #[error("Bill {0} has no items to process")]
    NoItemsToProcess(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl PaymentError {
    /// True for rejections caused by the request itself rather than by
    /// the storage layer.
    pub fn is_domain_error(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}
