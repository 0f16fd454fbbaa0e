use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The five record kinds managed by the clinic backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Patient,
    Doctor,
    Appointment,
    Bill,
    InventoryItem,
}

impl RecordKind {
    /// All kinds, in a stable order.
    pub const ALL: [RecordKind; 5] = [
        RecordKind::Patient,
        RecordKind::Doctor,
        RecordKind::Appointment,
        RecordKind::Bill,
        RecordKind::InventoryItem,
    ];

    /// The collection name a kind is persisted under.
    ///
    /// These match the original document-store collections, so a deployment
    /// can point at an existing store without renaming anything.
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Patient => "patients",
            Self::Doctor => "doctors",
            Self::Appointment => "appointments",
            Self::Bill => "billing",
            Self::InventoryItem => "inventory",
        }
    }

    /// Resolves a URL path segment (the collection name) back to a kind.
    pub fn from_collection(segment: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.collection() == segment)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Patient => write!(f, "Patient"),
            Self::Doctor => write!(f, "Doctor"),
            Self::Appointment => write!(f, "Appointment"),
            Self::Bill => write!(f, "Bill"),
            Self::InventoryItem => write!(f, "InventoryItem"),
        }
    }
}

impl FromStr for RecordKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Patient" => Ok(Self::Patient),
            "Doctor" => Ok(Self::Doctor),
            "Appointment" => Ok(Self::Appointment),
            "Bill" => Ok(Self::Bill),
            "InventoryItem" => Ok(Self::InventoryItem),
            other => Err(CoreError::invalid_record_kind(other)),
        }
    }
}
