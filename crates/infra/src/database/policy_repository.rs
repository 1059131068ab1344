//! Reservation-control policy stored per property.
//!
//! A property without a policy row accepts reservations.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use guestlink_core::ReservationPolicy;
use guestlink_domain::{PolicyDecision, Result as DomainResult};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::task;

use super::manager::DbManager;
use crate::errors::{map_join_error, map_sql_error};

pub struct SqlitePolicyRepository {
    db: Arc<DbManager>,
}

impl SqlitePolicyRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Store the policy for a property, replacing any previous decision.
    pub async fn set_policy(&self, property_id: &str, decision: &PolicyDecision) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let property_id = property_id.to_string();
        let decision = decision.clone();

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            upsert_policy(&conn, &property_id, &decision).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl ReservationPolicy for SqlitePolicyRepository {
    async fn check_allowed(&self, property_id: &str) -> DomainResult<PolicyDecision> {
        let db = Arc::clone(&self.db);
        let property_id = property_id.to_string();

        task::spawn_blocking(move || -> DomainResult<PolicyDecision> {
            let conn = db.get_connection()?;
            let decision = query_policy(&conn, &property_id).map_err(map_sql_error)?;
            Ok(decision.unwrap_or_else(PolicyDecision::allow))
        })
        .await
        .map_err(map_join_error)?
    }
}

fn query_policy(conn: &Connection, property_id: &str) -> rusqlite::Result<Option<PolicyDecision>> {
    conn.query_row(
        "SELECT allowed, reason FROM property_policies WHERE property_id = ?1",
        params![property_id],
        |row| Ok(PolicyDecision { allowed: row.get::<_, i64>(0)? != 0, reason: row.get(1)? }),
    )
    .optional()
}

fn upsert_policy(
    conn: &Connection,
    property_id: &str,
    decision: &PolicyDecision,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO property_policies (property_id, allowed, reason, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(property_id) DO UPDATE SET
            allowed = excluded.allowed,
            reason = excluded.reason,
            updated_at = excluded.updated_at",
        params![property_id, i64::from(decision.allowed), decision.reason, Utc::now().timestamp()],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use guestlink_core::PropertyRepository;
    use guestlink_domain::Property;
    use tempfile::TempDir;

    use super::*;
    use crate::database::SqlitePropertyRepository;

    async fn setup() -> (SqlitePolicyRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = DbManager::new(temp_dir.path().join("policy.db"), 2).unwrap();
        db.run_migrations().unwrap();
        let db = Arc::new(db);

        SqlitePropertyRepository::new(Arc::clone(&db))
            .upsert_property(&Property { id: "cabin".into(), name: "Cabin".into(), ical_url: None })
            .await
            .unwrap();

        (SqlitePolicyRepository::new(db), temp_dir)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_policy_allows() {
        let (repo, _dir) = setup().await;
        assert_eq!(repo.check_allowed("cabin").await.unwrap(), PolicyDecision::allow());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stored_denial_is_returned_with_reason() {
        let (repo, _dir) = setup().await;
        repo.set_policy("cabin", &PolicyDecision::deny("closed for renovation")).await.unwrap();

        let decision = repo.check_allowed("cabin").await.unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.reason.as_deref(), Some("closed for renovation"));

        repo.set_policy("cabin", &PolicyDecision::allow()).await.unwrap();
        assert!(repo.check_allowed("cabin").await.unwrap().allowed);
    }
}
