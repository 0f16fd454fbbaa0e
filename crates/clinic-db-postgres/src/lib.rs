//! Optional PostgreSQL mirror for the clinic backend.
//!
//! Implements the `MirrorSink` seam from `clinic-storage`: a write-only
//! relational copy of every committed record, one table per kind. The
//! mirror is best-effort; the in-memory store stays the source of truth
//! and nothing is ever read back from here.

pub mod config;
pub mod error;
pub mod mirror;
pub mod pool;
pub mod schema;

pub use config::PostgresMirrorConfig;
pub use error::{PostgresError, Result};
pub use mirror::PostgresMirror;
pub use pool::create_pool;

use clinic_storage::DynMirror;

/// Connects to PostgreSQL, creates any missing mirror tables, and returns
/// a shareable sink.
pub async fn create_mirror(config: &PostgresMirrorConfig) -> Result<DynMirror> {
    let pool = pool::create_pool(config).await?;
    schema::ensure_tables(&pool).await?;
    Ok(std::sync::Arc::new(PostgresMirror::new(pool)))
}
