//! Mirror table management: one table per record kind.
//!
//! Columns follow the wire field names so the mirror reads naturally in
//! SQL. Bill items are stored as JSON text; the mirror is write-only and
//! never parsed back.

use sqlx_core::query::query;
use sqlx_postgres::PgPool;
use tracing::instrument;

use clinic_core::RecordKind;

use crate::error::Result;

/// The mirror table for a kind; identical to the collection name.
pub fn table_name(kind: RecordKind) -> &'static str {
    kind.collection()
}

const CREATE_TABLES: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS patients (
        id TEXT PRIMARY KEY,
        name TEXT,
        contact TEXT,
        history TEXT,
        dob TEXT,
        gender TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS doctors (
        id TEXT PRIMARY KEY,
        name TEXT,
        specialty TEXT,
        schedule TEXT,
        fee DOUBLE PRECISION
    )"#,
    r#"CREATE TABLE IF NOT EXISTS appointments (
        id TEXT PRIMARY KEY,
        patient TEXT,
        doctor TEXT,
        datetime TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS billing (
        id TEXT PRIMARY KEY,
        patient TEXT,
        items TEXT,
        total DOUBLE PRECISION,
        status TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS inventory (
        id TEXT PRIMARY KEY,
        item TEXT,
        quantity BIGINT,
        supplier TEXT,
        price DOUBLE PRECISION
    )"#,
];

/// Creates every mirror table that does not exist yet.
#[instrument(skip(pool))]
pub async fn ensure_tables(pool: &PgPool) -> Result<()> {
    for statement in CREATE_TABLES {
        query(statement).execute(pool).await?;
    }
    Ok(())
}
