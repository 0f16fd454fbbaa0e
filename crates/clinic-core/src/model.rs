//! Typed clinic record models.
//!
//! Field names on the wire follow the original document-store layout
//! (`dob`, `fee`, `item`, `price`, `total`, `datetime`), so existing data
//! deserializes without migration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub history: String,
    #[serde(rename = "dob", skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub schedule: String,
    #[serde(rename = "fee", skip_serializing_if = "Option::is_none")]
    pub consultation_fee: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "patient")]
    pub patient_id: String,
    #[serde(rename = "doctor")]
    pub doctor_id: String,
    #[serde(rename = "datetime", default)]
    pub scheduled_at: String,
}

/// Bill payment status. The only transition is `Pending -> Paid`;
/// `Paid` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BillStatus {
    #[default]
    Pending,
    Paid,
}

/// One entry in a bill's items list.
///
/// A non-stock item (e.g. a consultation fee) carries no inventory
/// reference and never decrements stock. The flag is explicit rather than
/// a sentinel id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "inventoryItemId", default, skip_serializing_if = "Option::is_none")]
    pub inventory_item_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(rename = "nonStock", default)]
    pub non_stock: bool,
}

impl LineItem {
    /// Whether this item decrements inventory when its bill is paid.
    /// Items without an inventory reference are treated as non-stock.
    pub fn is_stock(&self) -> bool {
        !self.non_stock && self.inventory_item_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "patient", default)]
    pub patient_id: String,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(rename = "total", default)]
    pub total_amount: f64,
    #[serde(default)]
    pub status: BillStatus,
}

impl Bill {
    pub fn is_paid(&self) -> bool {
        self.status == BillStatus::Paid
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "item")]
    pub name: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub supplier: String,
    #[serde(rename = "price", skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bill_status_serialization() {
        assert_eq!(serde_json::to_string(&BillStatus::Pending).unwrap(), "\"Pending\"");
        assert_eq!(serde_json::to_string(&BillStatus::Paid).unwrap(), "\"Paid\"");
        assert_eq!(BillStatus::default(), BillStatus::Pending);
    }

    #[test]
    fn bill_deserializes_wire_names() {
        let bill: Bill = serde_json::from_value(json!({
            "patient": "p-1",
            "items": [
                {"inventoryItemId": "bandage-1", "name": "Bandage", "quantity": 3},
                {"name": "Consultation", "quantity": 1, "nonStock": true},
            ],
            "total": 42.5,
            "status": "Pending",
        }))
        .unwrap();

        assert_eq!(bill.patient_id, "p-1");
        assert_eq!(bill.total_amount, 42.5);
        assert!(!bill.is_paid());
        assert!(bill.items[0].is_stock());
        assert!(!bill.items[1].is_stock());
    }

    #[test]
    fn missing_inventory_reference_is_non_stock() {
        let item: LineItem =
            serde_json::from_value(json!({"name": "Follow-up", "quantity": 1})).unwrap();
        assert!(!item.is_stock());
    }

    #[test]
    fn inventory_item_wire_names() {
        let item: InventoryItem = serde_json::from_value(json!({
            "item": "Bandage",
            "quantity": 10,
            "supplier": "Acme",
            "price": 1.25,
        }))
        .unwrap();
        assert_eq!(item.name, "Bandage");
        assert_eq!(item.unit_price, Some(1.25));

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["item"], "Bandage");
    }

    #[test]
    fn bill_with_missing_items_deserializes_empty() {
        let bill: Bill = serde_json::from_value(json!({"patient": "p-2"})).unwrap();
        assert!(bill.items.is_empty());
        assert_eq!(bill.status, BillStatus::Pending);
    }
}
