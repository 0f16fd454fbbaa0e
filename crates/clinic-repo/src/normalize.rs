//! Per-kind payload normalization.
//!
//! Incoming payloads are raw JSON from clients. Normalization validates
//! the structural minimum for each kind, strips any embedded `id`, runs
//! money and quantity fields through the lenient coercion functions, and
//! fills defaults (new bills start `Pending`). The result is what actually
//! lands in storage.

use serde_json::{Map, Value, json};

use clinic_core::{RecordKind, coerce};

use crate::error::RepoError;

/// Validates and normalizes a client payload for storage.
pub fn normalize(kind: RecordKind, payload: &Value) -> Result<Value, RepoError> {
    let mut obj = payload
        .as_object()
        .cloned()
        .ok_or_else(|| RepoError::validation(format!("{kind} payload must be a JSON object")))?;
    obj.remove("id");

    match kind {
        RecordKind::Patient => {
            require_name(&obj, "name", kind)?;
        }
        RecordKind::Doctor => {
            require_name(&obj, "name", kind)?;
            if obj.contains_key("fee") {
                let fee = coerce::money_or_zero(obj.get("fee"));
                obj.insert("fee".to_string(), json!(fee));
            }
        }
        RecordKind::Appointment => {
            require_name(&obj, "patient", kind)?;
            require_name(&obj, "doctor", kind)?;
        }
        RecordKind::Bill => {
            let total = coerce::money_or_zero(obj.get("total"));
            obj.insert("total".to_string(), json!(total));
            obj.entry("status").or_insert_with(|| json!("Pending"));
            normalize_items(&mut obj)?;
        }
        RecordKind::InventoryItem => {
            require_name(&obj, "item", kind)?;
            let quantity = coerce::quantity_or_zero(obj.get("quantity"));
            obj.insert("quantity".to_string(), json!(quantity));
            if obj.contains_key("price") {
                let price = coerce::money_or_zero(obj.get("price"));
                obj.insert("price".to_string(), json!(price));
            }
        }
    }

    Ok(Value::Object(obj))
}

fn require_name(obj: &Map<String, Value>, field: &str, kind: RecordKind) -> Result<(), RepoError> {
    match obj.get(field).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(RepoError::validation(format!(
            "{kind} payload requires a non-empty '{field}'"
        ))),
    }
}

/// Bill items must be an array of objects; each entry gets its quantity
/// coerced. An absent list is allowed (it deserializes as empty).
fn normalize_items(obj: &mut Map<String, Value>) -> Result<(), RepoError> {
    let Some(items) = obj.get_mut("items") else {
        return Ok(());
    };
    let items = items
        .as_array_mut()
        .ok_or_else(|| RepoError::validation("'items' must be an array"))?;

    for item in items {
        let entry = item
            .as_object_mut()
            .ok_or_else(|| RepoError::validation("each bill item must be a JSON object"))?;
        let quantity = coerce::quantity_or_zero(entry.get("quantity"));
        entry.insert("quantity".to_string(), json!(quantity));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_object_payloads() {
        let err = normalize(RecordKind::Patient, &json!("just a string")).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn strips_embedded_id() {
        let out = normalize(RecordKind::Patient, &json!({"id": "spoof", "name": "Ada"})).unwrap();
        assert!(out.get("id").is_none());
    }

    #[test]
    fn patient_requires_a_name() {
        assert!(normalize(RecordKind::Patient, &json!({"contact": "x"})).is_err());
        assert!(normalize(RecordKind::Patient, &json!({"name": "  "})).is_err());
        assert!(normalize(RecordKind::Patient, &json!({"name": "Ada"})).is_ok());
    }

    #[test]
    fn appointment_requires_both_references() {
        assert!(normalize(RecordKind::Appointment, &json!({"patient": "p-1"})).is_err());
        let out = normalize(
            RecordKind::Appointment,
            &json!({"patient": "p-1", "doctor": "d-1", "datetime": "2026-08-23T10:00"}),
        )
        .unwrap();
        assert_eq!(out["datetime"], "2026-08-23T10:00");
    }

    #[test]
    fn doctor_fee_is_coerced_when_present() {
        let out = normalize(RecordKind::Doctor, &json!({"name": "Dr", "fee": "50.5"})).unwrap();
        assert_eq!(out["fee"], 50.5);

        let out = normalize(RecordKind::Doctor, &json!({"name": "Dr", "fee": "free"})).unwrap();
        assert_eq!(out["fee"], 0.0);

        let out = normalize(RecordKind::Doctor, &json!({"name": "Dr"})).unwrap();
        assert!(out.get("fee").is_none());
    }

    #[test]
    fn new_bills_default_to_pending_and_coerce_numbers() {
        let out = normalize(
            RecordKind::Bill,
            &json!({
                "patient": "p-1",
                "total": "25.0",
                "items": [{"name": "Bandage", "quantity": "3"}],
            }),
        )
        .unwrap();
        assert_eq!(out["status"], "Pending");
        assert_eq!(out["total"], 25.0);
        assert_eq!(out["items"][0]["quantity"], 3);
    }

    #[test]
    fn explicit_bill_status_is_kept() {
        let out = normalize(RecordKind::Bill, &json!({"patient": "p-1", "status": "Paid"})).unwrap();
        assert_eq!(out["status"], "Paid");
    }

    #[test]
    fn malformed_bill_items_are_rejected() {
        assert!(normalize(RecordKind::Bill, &json!({"items": "three bandages"})).is_err());
        assert!(normalize(RecordKind::Bill, &json!({"items": ["bandage"]})).is_err());
    }

    #[test]
    fn inventory_quantity_never_goes_negative() {
        let out = normalize(
            RecordKind::InventoryItem,
            &json!({"item": "Bandage", "quantity": -5, "price": "1.25"}),
        )
        .unwrap();
        assert_eq!(out["quantity"], 0);
        assert_eq!(out["price"], 1.25);
    }
}
