//! Core record types and utilities for the clinic backend.

pub mod coerce;
pub mod error;
pub mod id;
pub mod kind;
pub mod model;

pub use error::{CoreError, Result};
pub use id::{generate_id, validate_id};
pub use kind::RecordKind;
pub use model::{Appointment, Bill, BillStatus, Doctor, InventoryItem, LineItem, Patient};
