use std::sync::Arc;

use clinic_billing::PaymentEngine;
use clinic_db_memory::{create_storage, create_storage_with_app_id};
use clinic_repo::Repositories;
use clinic_storage::{DynMirror, NoopMirror};

use crate::config::AppConfig;

/// Shared handler state: one repository per record kind plus the payment
/// engine, all backed by the same storage handle.
#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub payments: PaymentEngine,
}

/// Builds the state from configuration.
///
/// A configured mirror that fails to connect is downgraded to a warning;
/// the server starts without it rather than refusing to boot, since the
/// mirror is write-only and never read back.
pub async fn build_state(cfg: &AppConfig) -> AppState {
    let storage = match cfg.storage.app_id.as_deref() {
        Some(app_id) => create_storage_with_app_id(app_id),
        None => create_storage(),
    };

    let mirror: DynMirror = match cfg.storage.mirror.as_ref() {
        Some(mirror_cfg) => match clinic_db_postgres::create_mirror(mirror_cfg).await {
            Ok(mirror) => {
                tracing::info!("postgres mirror connected");
                mirror
            }
            Err(err) => {
                tracing::warn!(error = %err, "postgres mirror unavailable, continuing without it");
                Arc::new(NoopMirror)
            }
        },
        None => Arc::new(NoopMirror),
    };

    AppState {
        repos: Repositories::new(storage.clone(), mirror),
        payments: PaymentEngine::new(storage),
    }
}
