//! SQLite-backed verification token store.
//!
//! Two partial unique indexes back the service rules: one active manual
//! token per property, one auto token per (property, code). Writes that
//! touch more than one row run in an IMMEDIATE transaction.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guestlink_core::TokenRepository;
use guestlink_domain::{
    AutoTokenOutcome, AutoTokenSpec, NewVerificationToken, Result as DomainResult, TokenSource,
    VerificationToken,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use tokio::task;

use super::columns::{instant_from_sql, instant_to_sql, optional_instant_from_sql};
use super::manager::DbManager;
use crate::errors::{map_join_error, map_sql_error};

const TOKEN_COLUMNS: &str = "id, token, property_id, booking_id, external_code, access_code_hash,
     source, is_active, expires_at, used_count, last_used_at, created_at";

pub struct SqliteTokenRepository {
    db: Arc<DbManager>,
}

impl SqliteTokenRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenRepository for SqliteTokenRepository {
    async fn replace_active_manual(&self, token: &NewVerificationToken) -> DomainResult<usize> {
        let db = Arc::clone(&self.db);
        let token = token.clone();

        task::spawn_blocking(move || -> DomainResult<usize> {
            let mut conn = db.get_connection()?;
            replace_manual(&mut conn, &token).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_by_token(&self, token: &str) -> DomainResult<Option<VerificationToken>> {
        let db = Arc::clone(&self.db);
        let token = token.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<VerificationToken>> {
            let conn = db.get_connection()?;
            conn.query_row(
                &format!("SELECT {TOKEN_COLUMNS} FROM guest_verification_tokens WHERE token = ?1"),
                params![token],
                map_row,
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn record_usage(&self, token_id: &str, used_at: DateTime<Utc>) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let token_id = token_id.to_string();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "UPDATE guest_verification_tokens
                 SET used_count = used_count + 1, last_used_at = ?2
                 WHERE id = ?1",
                params![token_id, instant_to_sql(used_at)],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn upsert_auto_token(&self, spec: &AutoTokenSpec) -> DomainResult<AutoTokenOutcome> {
        let db = Arc::clone(&self.db);
        let spec = spec.clone();

        task::spawn_blocking(move || -> DomainResult<AutoTokenOutcome> {
            let mut conn = db.get_connection()?;
            upsert_auto(&mut conn, &spec).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn deactivate_manual(&self, property_id: &str) -> DomainResult<usize> {
        let db = Arc::clone(&self.db);
        let property_id = property_id.to_string();

        task::spawn_blocking(move || -> DomainResult<usize> {
            let conn = db.get_connection()?;
            deactivate_active_manual(&conn, &property_id).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_active_manual(&self, property_id: &str) -> DomainResult<Option<VerificationToken>> {
        let db = Arc::clone(&self.db);
        let property_id = property_id.to_string();

        task::spawn_blocking(move || -> DomainResult<Option<VerificationToken>> {
            let conn = db.get_connection()?;
            conn.query_row(
                &format!(
                    "SELECT {TOKEN_COLUMNS} FROM guest_verification_tokens
                     WHERE property_id = ?1 AND source = 'manual' AND is_active = 1"
                ),
                params![property_id],
                map_row,
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

// ============================================================================
// Synchronous SQL Operations (called inside spawn_blocking)
// ============================================================================

fn map_row(row: &Row<'_>) -> rusqlite::Result<VerificationToken> {
    let source: String = row.get(6)?;
    let source = source.parse::<TokenSource>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(6, Type::Text, e.to_string().into())
    })?;

    Ok(VerificationToken {
        id: row.get(0)?,
        token: row.get(1)?,
        property_id: row.get(2)?,
        booking_id: row.get(3)?,
        external_code: row.get(4)?,
        access_code_hash: row.get(5)?,
        source,
        is_active: row.get::<_, i64>(7)? != 0,
        expires_at: instant_from_sql(8, row.get(8)?)?,
        used_count: row.get(9)?,
        last_used_at: optional_instant_from_sql(10, row.get(10)?)?,
        created_at: instant_from_sql(11, row.get(11)?)?,
    })
}

fn deactivate_active_manual(conn: &Connection, property_id: &str) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE guest_verification_tokens SET is_active = 0
         WHERE property_id = ?1 AND source = 'manual' AND is_active = 1",
        params![property_id],
    )
}

fn replace_manual(conn: &mut Connection, token: &NewVerificationToken) -> rusqlite::Result<usize> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let deactivated = deactivate_active_manual(&tx, &token.property_id)?;

    tx.execute(
        "INSERT INTO guest_verification_tokens (
            id, token, property_id, booking_id, external_code, access_code_hash,
            source, is_active, expires_at, used_count, last_used_at, created_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'manual', 1, ?7, 0, NULL, ?8)",
        params![
            token.id,
            token.token,
            token.property_id,
            token.booking_id,
            token.external_code,
            token.access_code_hash,
            instant_to_sql(token.expires_at),
            instant_to_sql(token.created_at),
        ],
    )?;

    tx.commit()?;
    Ok(deactivated)
}

fn upsert_auto(conn: &mut Connection, spec: &AutoTokenSpec) -> rusqlite::Result<AutoTokenOutcome> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let existing: Option<String> = tx
        .query_row(
            "SELECT id FROM guest_verification_tokens
             WHERE property_id = ?1 AND external_code = ?2 AND source = 'auto'",
            params![spec.property_id, spec.external_code],
            |row| row.get(0),
        )
        .optional()?;

    let outcome = match existing {
        Some(id) => {
            tx.execute(
                "UPDATE guest_verification_tokens
                 SET access_code_hash = ?2, expires_at = ?3, is_active = 1
                 WHERE id = ?1",
                params![id, spec.access_code_hash, instant_to_sql(spec.expires_at)],
            )?;
            AutoTokenOutcome::Refreshed
        }
        None => {
            tx.execute(
                "INSERT INTO guest_verification_tokens (
                    id, token, property_id, booking_id, external_code, access_code_hash,
                    source, is_active, expires_at, used_count, last_used_at, created_at
                 ) VALUES (?1, ?2, ?3, NULL, ?4, ?5, 'auto', 1, ?6, 0, NULL, ?7)",
                params![
                    spec.id,
                    spec.token,
                    spec.property_id,
                    spec.external_code,
                    spec.access_code_hash,
                    instant_to_sql(spec.expires_at),
                    instant_to_sql(spec.created_at),
                ],
            )?;
            AutoTokenOutcome::Created
        }
    };

    tx.commit()?;
    Ok(outcome)
}
