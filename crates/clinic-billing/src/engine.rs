//! The payment engine: marks a bill paid and decrements stock atomically.
//!
//! All mutation goes through one optimistic transaction with three phases:
//! read (bill, then every referenced inventory item), validate (pure
//! planning over the snapshot, nothing queued on failure), write (bill
//! status plus new quantities). A commit-time conflict re-runs the whole
//! unit from the read phase, so a bill paid by a racing request is seen as
//! `AlreadyPaid` on the retry and stock is never decremented twice.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use clinic_core::{Bill, BillStatus, InventoryItem, RecordKind};
use clinic_storage::{DynStorage, StorageError, with_transaction};

use crate::error::PaymentError;

/// What a successful payment changed: the bill (now `Paid`) and every
/// inventory item whose quantity was reduced, with post-payment values.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentReceipt {
    pub bill: Bill,
    pub inventory: Vec<InventoryItem>,
}

/// Processes bill payments against a shared storage handle.
#[derive(Clone)]
pub struct PaymentEngine {
    storage: DynStorage,
}

impl PaymentEngine {
    pub fn new(storage: DynStorage) -> Self {
        Self { storage }
    }

    /// Pays a bill: flips its status to `Paid` and deducts every stock
    /// line from inventory, all-or-nothing.
    ///
    /// # Errors
    ///
    /// Domain rejections (`BillNotFound`, `AlreadyPaid`,
    /// `InventoryItemNotFound`, `InsufficientStock`, `NoItemsToProcess`)
    /// leave the store untouched. `PaymentError::Storage` covers
    /// infrastructure failures and exhausted conflict retries.
    #[tracing::instrument(skip(self), fields(bill_id = %bill_id))]
    pub async fn process_payment(&self, bill_id: &str) -> Result<PaymentReceipt, PaymentError> {
        let bill_id = bill_id.to_string();
        let receipt = with_transaction(self.storage.as_ref(), move |txn| {
            let bill_id = bill_id.clone();
            Box::pin(async move {
                // Read phase: the bill first, then every referenced item.
                let record = txn
                    .read_for_update(RecordKind::Bill, &bill_id)
                    .await?
                    .ok_or_else(|| PaymentError::BillNotFound(bill_id.clone()))?;
                let mut bill: Bill = record.decode()?;

                if bill.is_paid() {
                    return Err(PaymentError::AlreadyPaid(bill_id));
                }

                let mut stock = Vec::new();
                for (item_id, line_name) in stock_references(&bill) {
                    let record = txn
                        .read_for_update(RecordKind::InventoryItem, &item_id)
                        .await?
                        .ok_or(PaymentError::InventoryItemNotFound { name: line_name })?;
                    stock.push(record.decode::<InventoryItem>()?);
                }

                // Validation phase: pure planning over the snapshot.
                // Nothing is queued unless every line can be satisfied.
                let updated = plan_deductions(&bill, &stock)?;

                // Write phase.
                bill.status = BillStatus::Paid;
                txn.write(RecordKind::Bill, &bill.id, to_fields(&bill)?);
                for item in &updated {
                    txn.write(RecordKind::InventoryItem, &item.id, to_fields(item)?);
                }

                Ok(PaymentReceipt {
                    bill,
                    inventory: updated,
                })
            })
        })
        .await?;

        tracing::info!(
            bill_id = %receipt.bill.id,
            items_deducted = receipt.inventory.len(),
            "bill paid"
        );
        Ok(receipt)
    }
}

/// The inventory ids a bill's stock lines reference, deduplicated in
/// first-occurrence order, each paired with a line name for error
/// reporting.
fn stock_references(bill: &Bill) -> Vec<(String, String)> {
    let mut seen = Vec::new();
    for line in bill.items.iter().filter(|l| l.is_stock()) {
        let Some(item_id) = line.inventory_item_id.as_deref() else {
            continue;
        };
        if seen.iter().any(|(id, _): &(String, String)| id == item_id) {
            continue;
        }
        seen.push((item_id.to_string(), line.name.clone()));
    }
    seen
}

/// Computes post-payment inventory quantities for a bill against a stock
/// snapshot. Fails without partial results: either every stock line fits,
/// or the first shortfall rejects the whole plan.
///
/// `stock` must hold each referenced item exactly once; lines sharing an
/// item accumulate against the same remaining quantity.
fn plan_deductions(bill: &Bill, stock: &[InventoryItem]) -> Result<Vec<InventoryItem>, PaymentError> {
    if bill.items.is_empty() {
        return Err(PaymentError::NoItemsToProcess(bill.id.clone()));
    }

    let mut working: HashMap<&str, InventoryItem> =
        stock.iter().map(|i| (i.id.as_str(), i.clone())).collect();

    for line in bill.items.iter().filter(|l| l.is_stock()) {
        let Some(item_id) = line.inventory_item_id.as_deref() else {
            continue;
        };
        let item = working
            .get_mut(item_id)
            .ok_or(PaymentError::InventoryItemNotFound {
                name: line.name.clone(),
            })?;
        item.quantity = item.quantity.checked_sub(line.quantity).ok_or_else(|| {
            PaymentError::InsufficientStock {
                item: item.name.clone(),
                requested: line.quantity,
                available: item.quantity,
            }
        })?;
    }

    // Preserve the read order for deterministic receipts.
    Ok(stock
        .iter()
        .filter_map(|i| working.get(i.id.as_str()).cloned())
        .collect())
}

/// Serializes a model into storage fields, dropping the id (it lives on
/// the record envelope).
fn to_fields<T: Serialize>(model: &T) -> Result<Value, StorageError> {
    let mut value = serde_json::to_value(model)
        .map_err(|e| StorageError::invalid_record(format!("cannot encode record: {e}")))?;
    if let Some(obj) = value.as_object_mut() {
        obj.remove("id");
    }
    Ok(value)
}
