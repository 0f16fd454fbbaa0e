//! Record repositories: the CRUD layer between the HTTP handlers and the
//! storage backend.
//!
//! Each clinic record kind gets a [`RecordRepository`] that validates and
//! normalizes client payloads, talks to the primary store, and fans
//! successful writes out to the configured mirror sink. [`Repositories`]
//! bundles the five of them for the server state.

pub mod error;
pub mod normalize;
pub mod repository;

pub use error::RepoError;
pub use repository::RecordRepository;

use clinic_core::RecordKind;
use clinic_storage::{DynMirror, DynStorage};

/// One repository per record kind, sharing a storage handle and mirror.
#[derive(Clone)]
pub struct Repositories {
    pub patients: RecordRepository,
    pub doctors: RecordRepository,
    pub appointments: RecordRepository,
    pub bills: RecordRepository,
    pub inventory: RecordRepository,
}

impl Repositories {
    pub fn new(storage: DynStorage, mirror: DynMirror) -> Self {
        let repo = |kind| RecordRepository::new(kind, storage.clone(), mirror.clone());
        Self {
            patients: repo(RecordKind::Patient),
            doctors: repo(RecordKind::Doctor),
            appointments: repo(RecordKind::Appointment),
            bills: repo(RecordKind::Bill),
            inventory: repo(RecordKind::InventoryItem),
        }
    }

    /// The repository handling a given kind.
    pub fn for_kind(&self, kind: RecordKind) -> &RecordRepository {
        match kind {
            RecordKind::Patient => &self.patients,
            RecordKind::Doctor => &self.doctors,
            RecordKind::Appointment => &self.appointments,
            RecordKind::Bill => &self.bills,
            RecordKind::InventoryItem => &self.inventory,
        }
    }
}
