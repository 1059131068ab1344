//! Per-property calendar sync status.

use std::sync::Arc;

use async_trait::async_trait;
use guestlink_core::SyncStatusRepository;
use guestlink_domain::{Result as DomainResult, SyncState, SyncStatus};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::task;

use super::columns::{instant_to_sql, optional_instant_from_sql};
use super::manager::DbManager;
use crate::errors::{map_join_error, map_sql_error};

pub struct SqliteSyncStatusRepository {
    db: Arc<DbManager>,
}

impl SqliteSyncStatusRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SyncStatusRepository for SqliteSyncStatusRepository {
    async fn get_status(&self, property_id: &str) -> DomainResult<Option<SyncStatus>> {
        let db = Arc::clone(&self.db);
        let property_id = property_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<SyncStatus>> {
            let conn = db.get_connection()?;
            query_status(&conn, &property_id).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn save_status(&self, status: &SyncStatus) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let status = status.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            upsert_status(&conn, &status).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn query_status(conn: &Connection, property_id: &str) -> rusqlite::Result<Option<SyncStatus>> {
    conn.query_row(
        "SELECT property_id, state, last_sync_at, last_error, reservations_count
         FROM calendar_sync_status WHERE property_id = ?1",
        params![property_id],
        |row| {
            let state: String = row.get(1)?;
            let state = state.parse::<SyncState>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(1, Type::Text, e.into())
            })?;
            Ok(SyncStatus {
                property_id: row.get(0)?,
                state,
                last_sync_at: optional_instant_from_sql(2, row.get(2)?)?,
                last_error: row.get(3)?,
                reservations_count: row.get(4)?,
            })
        },
    )
    .optional()
}

fn upsert_status(conn: &Connection, status: &SyncStatus) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO calendar_sync_status
            (property_id, state, last_sync_at, last_error, reservations_count)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(property_id) DO UPDATE SET
            state = excluded.state,
            last_sync_at = excluded.last_sync_at,
            last_error = excluded.last_error,
            reservations_count = excluded.reservations_count",
        params![
            status.property_id,
            status.state.to_string(),
            status.last_sync_at.map(instant_to_sql),
            status.last_error,
            status.reservations_count,
        ],
    )?;
    Ok(())
}
