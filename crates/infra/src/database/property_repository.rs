//! SQLite-backed property registry.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use guestlink_core::PropertyRepository;
use guestlink_domain::{Property, Result as DomainResult};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::task;

use super::manager::DbManager;
use crate::errors::{map_join_error, map_sql_error};

pub struct SqlitePropertyRepository {
    db: Arc<DbManager>,
}

impl SqlitePropertyRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// All registered properties ordered by id.
    pub async fn list_properties(&self) -> DomainResult<Vec<Property>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<Property>> {
            let conn = db.get_connection()?;
            query_all(&conn).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl PropertyRepository for SqlitePropertyRepository {
    async fn find_property(&self, property_id: &str) -> DomainResult<Option<Property>> {
        let db = Arc::clone(&self.db);
        let property_id = property_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<Property>> {
            let conn = db.get_connection()?;
            query_one(&conn, &property_id).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn upsert_property(&self, property: &Property) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let property = property.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            upsert(&conn, &property).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn query_one(conn: &Connection, property_id: &str) -> rusqlite::Result<Option<Property>> {
    conn.query_row(
        "SELECT id, name, ical_url FROM properties WHERE id = ?1",
        params![property_id],
        |row| Ok(Property { id: row.get(0)?, name: row.get(1)?, ical_url: row.get(2)? }),
    )
    .optional()
}

fn query_all(conn: &Connection) -> rusqlite::Result<Vec<Property>> {
    let mut stmt = conn.prepare("SELECT id, name, ical_url FROM properties ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(Property { id: row.get(0)?, name: row.get(1)?, ical_url: row.get(2)? })
    })?;
    rows.collect()
}

fn upsert(conn: &Connection, property: &Property) -> rusqlite::Result<()> {
    let now = Utc::now().timestamp();
    conn.execute(
        "INSERT INTO properties (id, name, ical_url, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            ical_url = excluded.ical_url,
            updated_at = excluded.updated_at",
        params![property.id, property.name, property.ical_url, now],
    )?;
    Ok(())
}
