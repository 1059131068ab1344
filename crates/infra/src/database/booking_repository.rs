//! Validated bookings recorded by the guest verification flow.

use std::sync::Arc;

use async_trait::async_trait;
use guestlink_core::ValidatedBookingRepository;
use guestlink_domain::{Result as DomainResult, ValidatedBooking};
use rusqlite::{params, Connection};
use tokio::task;

use super::manager::DbManager;
use crate::errors::{map_join_error, map_sql_error};

pub struct SqliteBookingRepository {
    db: Arc<DbManager>,
}

impl SqliteBookingRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ValidatedBookingRepository for SqliteBookingRepository {
    async fn list_for_property(&self, property_id: &str) -> DomainResult<Vec<ValidatedBooking>> {
        let db = Arc::clone(&self.db);
        let property_id = property_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Vec<ValidatedBooking>> {
            let conn = db.get_connection()?;
            query_for_property(&conn, &property_id).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn record_validated_booking(&self, booking: &ValidatedBooking) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let booking = booking.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            upsert(&conn, &booking).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn query_for_property(
    conn: &Connection,
    property_id: &str,
) -> rusqlite::Result<Vec<ValidatedBooking>> {
    let mut stmt = conn.prepare(
        "SELECT id, property_id, booking_code, guest_name, validated_at
         FROM validated_bookings
         WHERE property_id = ?1
         ORDER BY validated_at",
    )?;
    let rows = stmt.query_map(params![property_id], |row| {
        let validated_at: i64 = row.get(4)?;
        Ok(ValidatedBooking {
            id: row.get(0)?,
            property_id: row.get(1)?,
            booking_code: row.get(2)?,
            guest_name: row.get(3)?,
            validated_at: super::columns::instant_from_sql(4, validated_at)?,
        })
    })?;
    rows.collect()
}

fn upsert(conn: &Connection, booking: &ValidatedBooking) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO validated_bookings (id, property_id, booking_code, guest_name, validated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(property_id, booking_code) DO UPDATE SET
            guest_name = excluded.guest_name,
            validated_at = excluded.validated_at",
        params![
            booking.id,
            booking.property_id,
            booking.booking_code,
            booking.guest_name,
            super::columns::instant_to_sql(booking.validated_at),
        ],
    )?;
    Ok(())
}
