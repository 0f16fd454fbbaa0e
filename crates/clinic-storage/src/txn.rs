//! Retry-on-conflict transaction driver.
//!
//! All multi-record units of work go through [`with_transaction`]: the
//! callback reads through the supplied [`TransactionContext`], queues its
//! writes, and the driver commits on success or rolls back on error. A
//! commit-time write conflict re-runs the callback from scratch (the read
//! set must be re-established, since the conflicting commit may have
//! changed the values it validated against). No other retry loops exist in
//! the codebase.

use futures_util::future::BoxFuture;

use crate::error::StorageError;
use crate::traits::{ClinicStorage, TransactionContext};

/// Bounded retries for commit-time write conflicts before the operation
/// surfaces as a transaction error.
pub const MAX_TXN_ATTEMPTS: u32 = 5;

/// Runs `body` as one atomic unit of work against `storage`.
///
/// - `Ok` from the body commits; a commit-time `WriteConflict` retries the
///   body up to [`MAX_TXN_ATTEMPTS`] times, then fails with
///   `StorageError::TransactionError`.
/// - `Err` from the body rolls back and returns immediately; domain
///   failures are never retried.
pub async fn with_transaction<T, E, F>(storage: &dyn ClinicStorage, body: F) -> Result<T, E>
where
    E: From<StorageError>,
    F: for<'a> Fn(&'a mut dyn TransactionContext) -> BoxFuture<'a, Result<T, E>>,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let mut txn = storage.begin().await.map_err(E::from)?;

        match body(txn.as_mut()).await {
            Ok(value) => match txn.commit().await {
                Ok(()) => return Ok(value),
                Err(err) if err.is_write_conflict() => {
                    if attempt >= MAX_TXN_ATTEMPTS {
                        tracing::warn!(attempt, error = %err, "transaction retries exhausted");
                        return Err(E::from(StorageError::transaction_error(format!(
                            "write conflict persisted after {MAX_TXN_ATTEMPTS} attempts: {err}"
                        ))));
                    }
                    tracing::debug!(attempt, error = %err, "write conflict, re-running transaction");
                }
                Err(err) => return Err(E::from(err)),
            },
            Err(err) => {
                // Nothing was applied; rollback just releases the context.
                if let Err(rb) = txn.rollback().await {
                    tracing::warn!(error = %rb, "transaction rollback failed");
                }
                return Err(err);
            }
        }
    }
}
