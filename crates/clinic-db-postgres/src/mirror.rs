//! The PostgreSQL `MirrorSink` implementation.
//!
//! Every committed write in the primary store is replayed here as an
//! upsert (`INSERT ... ON CONFLICT (id) DO UPDATE`), deletes as plain
//! deletes. Records are decoded into their typed models first, so a record
//! that cannot be mirrored surfaces as an encoding error for the caller to
//! log.

use async_trait::async_trait;
use sqlx_core::query::query;
use sqlx_postgres::PgPool;

use clinic_core::{Appointment, Bill, Doctor, InventoryItem, Patient, RecordKind};
use clinic_storage::{MirrorSink, StorageError, StoredRecord};

use crate::error::PostgresError;
use crate::schema::table_name;

const UPSERT_PATIENT: &str = r#"
    INSERT INTO patients (id, name, contact, history, dob, gender)
    VALUES ($1, $2, $3, $4, $5, $6)
    ON CONFLICT (id) DO UPDATE SET
        name = EXCLUDED.name, contact = EXCLUDED.contact,
        history = EXCLUDED.history, dob = EXCLUDED.dob, gender = EXCLUDED.gender
"#;

const UPSERT_DOCTOR: &str = r#"
    INSERT INTO doctors (id, name, specialty, schedule, fee)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (id) DO UPDATE SET
        name = EXCLUDED.name, specialty = EXCLUDED.specialty,
        schedule = EXCLUDED.schedule, fee = EXCLUDED.fee
"#;

const UPSERT_APPOINTMENT: &str = r#"
    INSERT INTO appointments (id, patient, doctor, datetime)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (id) DO UPDATE SET
        patient = EXCLUDED.patient, doctor = EXCLUDED.doctor,
        datetime = EXCLUDED.datetime
"#;

const UPSERT_BILL: &str = r#"
    INSERT INTO billing (id, patient, items, total, status)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (id) DO UPDATE SET
        patient = EXCLUDED.patient, items = EXCLUDED.items,
        total = EXCLUDED.total, status = EXCLUDED.status
"#;

const UPSERT_INVENTORY: &str = r#"
    INSERT INTO inventory (id, item, quantity, supplier, price)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (id) DO UPDATE SET
        item = EXCLUDED.item, quantity = EXCLUDED.quantity,
        supplier = EXCLUDED.supplier, price = EXCLUDED.price
"#;

/// Write-only relational mirror over a PostgreSQL pool.
pub struct PostgresMirror {
    pool: PgPool,
}

impl PostgresMirror {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn upsert_patient(&self, record: &StoredRecord) -> Result<(), StorageError> {
        let p: Patient = record.decode()?;
        query(UPSERT_PATIENT)
            .bind(&p.id)
            .bind(&p.name)
            .bind(&p.contact)
            .bind(&p.history)
            .bind(&p.date_of_birth)
            .bind(&p.gender)
            .execute(&self.pool)
            .await
            .map_err(PostgresError::from)?;
        Ok(())
    }

    async fn upsert_doctor(&self, record: &StoredRecord) -> Result<(), StorageError> {
        let d: Doctor = record.decode()?;
        query(UPSERT_DOCTOR)
            .bind(&d.id)
            .bind(&d.name)
            .bind(&d.specialty)
            .bind(&d.schedule)
            .bind(d.consultation_fee)
            .execute(&self.pool)
            .await
            .map_err(PostgresError::from)?;
        Ok(())
    }

    async fn upsert_appointment(&self, record: &StoredRecord) -> Result<(), StorageError> {
        let a: Appointment = record.decode()?;
        query(UPSERT_APPOINTMENT)
            .bind(&a.id)
            .bind(&a.patient_id)
            .bind(&a.doctor_id)
            .bind(&a.scheduled_at)
            .execute(&self.pool)
            .await
            .map_err(PostgresError::from)?;
        Ok(())
    }

    async fn upsert_bill(&self, record: &StoredRecord) -> Result<(), StorageError> {
        let b: Bill = record.decode()?;
        let items = serde_json::to_string(&b.items)
            .map_err(|e| PostgresError::encoding(format!("bill items: {e}")))?;
        let status = match b.status {
            clinic_core::BillStatus::Pending => "Pending",
            clinic_core::BillStatus::Paid => "Paid",
        };
        query(UPSERT_BILL)
            .bind(&b.id)
            .bind(&b.patient_id)
            .bind(items)
            .bind(b.total_amount)
            .bind(status)
            .execute(&self.pool)
            .await
            .map_err(PostgresError::from)?;
        Ok(())
    }

    async fn upsert_inventory(&self, record: &StoredRecord) -> Result<(), StorageError> {
        let i: InventoryItem = record.decode()?;
        query(UPSERT_INVENTORY)
            .bind(&i.id)
            .bind(&i.name)
            .bind(i64::from(i.quantity))
            .bind(&i.supplier)
            .bind(i.unit_price)
            .execute(&self.pool)
            .await
            .map_err(PostgresError::from)?;
        Ok(())
    }
}

#[async_trait]
impl MirrorSink for PostgresMirror {
    #[tracing::instrument(skip(self, record), fields(kind = %kind, id = %record.id))]
    async fn record_upserted(
        &self,
        kind: RecordKind,
        record: &StoredRecord,
    ) -> Result<(), StorageError> {
        match kind {
            RecordKind::Patient => self.upsert_patient(record).await,
            RecordKind::Doctor => self.upsert_doctor(record).await,
            RecordKind::Appointment => self.upsert_appointment(record).await,
            RecordKind::Bill => self.upsert_bill(record).await,
            RecordKind::InventoryItem => self.upsert_inventory(record).await,
        }
    }

    #[tracing::instrument(skip(self), fields(kind = %kind, id = %id))]
    async fn record_deleted(&self, kind: RecordKind, id: &str) -> Result<(), StorageError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", table_name(kind));
        query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(PostgresError::from)?;
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "postgres-mirror"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upserts_target_the_kind_tables() {
        let cases = [
            (RecordKind::Patient, UPSERT_PATIENT),
            (RecordKind::Doctor, UPSERT_DOCTOR),
            (RecordKind::Appointment, UPSERT_APPOINTMENT),
            (RecordKind::Bill, UPSERT_BILL),
            (RecordKind::InventoryItem, UPSERT_INVENTORY),
        ];
        for (kind, sql) in cases {
            assert!(sql.contains(&format!("INSERT INTO {}", table_name(kind))));
            assert!(sql.contains("ON CONFLICT (id) DO UPDATE"));
        }
    }
}
