//! SQLite-backed reservation store.
//!
//! Rows are unique per (property, external code). A reconciliation pass
//! upserts and deletes inside one transaction so a failing pass leaves the
//! previous state untouched.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use guestlink_core::ReservationRepository;
use guestlink_domain::{
    GuestLinkError, ReservationMetadata, ReservationUpsert, Result as DomainResult,
    StoredReservation,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use tokio::task;
use tracing::debug;
use uuid::Uuid;

use super::columns::{count_from_sql, count_to_sql, date_from_sql, date_to_sql};
use super::manager::DbManager;
use crate::errors::{map_join_error, map_sql_error};

pub struct SqliteReservationRepository {
    db: Arc<DbManager>,
}

impl SqliteReservationRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReservationRepository for SqliteReservationRepository {
    async fn list_for_property(&self, property_id: &str) -> DomainResult<Vec<StoredReservation>> {
        let db = Arc::clone(&self.db);
        let property_id = property_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Vec<StoredReservation>> {
            let conn = db.get_connection()?;
            query_for_property(&conn, &property_id).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn apply_reconciliation(
        &self,
        property_id: &str,
        upserts: &[ReservationUpsert],
        delete_codes: &[String],
    ) -> DomainResult<usize> {
        let db = Arc::clone(&self.db);
        let property_id = property_id.to_string();
        let upserts = upserts.to_vec();
        let delete_codes = delete_codes.to_vec();

        task::spawn_blocking(move || -> DomainResult<usize> {
            let mut conn = db.get_connection()?;
            apply(&mut conn, &property_id, &upserts, &delete_codes)
        })
        .await
        .map_err(map_join_error)?
    }
}

// ============================================================================
// Synchronous SQL Operations (called inside spawn_blocking)
// ============================================================================

fn query_for_property(
    conn: &Connection,
    property_id: &str,
) -> rusqlite::Result<Vec<StoredReservation>> {
    let mut stmt = conn.prepare(
        "SELECT id, property_id, external_code, start_date, end_date, guest_name, guest_count,
                summary, metadata_json, created_at, updated_at
         FROM reservations
         WHERE property_id = ?1
         ORDER BY start_date, external_code",
    )?;
    let rows = stmt.query_map(params![property_id], map_row)?;
    rows.collect()
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<StoredReservation> {
    let start: String = row.get(3)?;
    let end: String = row.get(4)?;
    let metadata_json: String = row.get(8)?;
    let metadata: ReservationMetadata = serde_json::from_str(&metadata_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e)))?;

    Ok(StoredReservation {
        id: row.get(0)?,
        property_id: row.get(1)?,
        external_code: row.get(2)?,
        start_date: date_from_sql(3, &start)?,
        end_date: date_from_sql(4, &end)?,
        guest_name: row.get(5)?,
        guest_count: count_from_sql(row.get(6)?),
        summary: row.get(7)?,
        metadata,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn apply(
    conn: &mut Connection,
    property_id: &str,
    upserts: &[ReservationUpsert],
    delete_codes: &[String],
) -> DomainResult<usize> {
    let now = Utc::now().timestamp();
    let tx = conn.transaction().map_err(map_sql_error)?;

    {
        let mut upsert = tx
            .prepare(
                "INSERT INTO reservations (
                    id, property_id, external_code, start_date, end_date, guest_name,
                    guest_count, summary, metadata_json, created_at, updated_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
                 ON CONFLICT(property_id, external_code) DO UPDATE SET
                    start_date = excluded.start_date,
                    end_date = excluded.end_date,
                    guest_name = excluded.guest_name,
                    guest_count = excluded.guest_count,
                    summary = excluded.summary,
                    metadata_json = excluded.metadata_json,
                    updated_at = excluded.updated_at",
            )
            .map_err(map_sql_error)?;

        for row in upserts {
            if row.property_id != property_id {
                return Err(GuestLinkError::Internal(
                    "reservation row belongs to another property".into(),
                ));
            }
            let metadata_json = serde_json::to_string(&row.metadata).map_err(|e| {
                GuestLinkError::Internal(format!("failed to encode reservation metadata: {e}"))
            })?;
            upsert
                .execute(params![
                    Uuid::now_v7().to_string(),
                    property_id,
                    row.external_code,
                    date_to_sql(row.start_date),
                    date_to_sql(row.end_date),
                    row.guest_name,
                    count_to_sql(row.guest_count),
                    row.summary,
                    metadata_json,
                    now,
                ])
                .map_err(map_sql_error)?;
        }
    }

    let mut deleted = 0;
    {
        let mut delete = tx
            .prepare("DELETE FROM reservations WHERE property_id = ?1 AND external_code = ?2")
            .map_err(map_sql_error)?;
        for code in delete_codes {
            deleted += delete.execute(params![property_id, code]).map_err(map_sql_error)?;
        }
    }

    tx.commit().map_err(map_sql_error)?;
    debug!(upserted = upserts.len(), deleted, "reservations reconciled");
    Ok(deleted)
}
