//! In-memory port implementations for testing
//!
//! `InMemoryStore` implements every storage port so a single handle can be
//! shared between the sync and token services, the way one database would be.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guestlink_core::{
    FeedSource, Pepper, PepperProvider, PropertyRepository, ReservationPolicy,
    ReservationRepository, SyncStatusRepository, TokenRepository, ValidatedBookingRepository,
};
use guestlink_domain::{
    AutoTokenOutcome, AutoTokenSpec, GuestLinkError, NewVerificationToken, PolicyDecision,
    Property, ReservationUpsert, Result as DomainResult, StoredReservation, SyncStatus,
    TokenSource, ValidatedBooking, VerificationToken,
};

#[derive(Default)]
struct StoreState {
    properties: Vec<Property>,
    reservations: Vec<StoredReservation>,
    bookings: Vec<ValidatedBooking>,
    statuses: Vec<SyncStatus>,
    tokens: Vec<VerificationToken>,
}

/// Shared in-memory store for all repository ports.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
    fail_usage_updates: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(self, property: Property) -> Self {
        self.state.lock().unwrap().properties.push(property);
        self
    }

    pub fn add_booking(&self, booking: ValidatedBooking) {
        self.state.lock().unwrap().bookings.push(booking);
    }

    pub fn insert_token(&self, token: VerificationToken) {
        self.state.lock().unwrap().tokens.push(token);
    }

    pub fn reservations(&self) -> Vec<StoredReservation> {
        let mut rows = self.state.lock().unwrap().reservations.clone();
        rows.sort_by(|a, b| a.external_code.cmp(&b.external_code));
        rows
    }

    pub fn tokens(&self) -> Vec<VerificationToken> {
        self.state.lock().unwrap().tokens.clone()
    }

    pub fn status(&self, property_id: &str) -> Option<SyncStatus> {
        self.state.lock().unwrap().statuses.iter().find(|s| s.property_id == property_id).cloned()
    }

    pub fn set_status(&self, status: SyncStatus) {
        let mut state = self.state.lock().unwrap();
        state.statuses.retain(|s| s.property_id != status.property_id);
        state.statuses.push(status);
    }

    pub fn fail_usage_updates(&self) {
        self.fail_usage_updates.store(true, Ordering::SeqCst);
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PropertyRepository for InMemoryStore {
    async fn find_property(&self, property_id: &str) -> DomainResult<Option<Property>> {
        Ok(self.state.lock().unwrap().properties.iter().find(|p| p.id == property_id).cloned())
    }

    async fn upsert_property(&self, property: &Property) -> DomainResult<()> {
        let mut state = self.state.lock().unwrap();
        state.properties.retain(|p| p.id != property.id);
        state.properties.push(property.clone());
        Ok(())
    }
}

#[async_trait]
impl ReservationRepository for InMemoryStore {
    async fn list_for_property(&self, property_id: &str) -> DomainResult<Vec<StoredReservation>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .reservations
            .iter()
            .filter(|r| r.property_id == property_id)
            .cloned()
            .collect())
    }

    async fn apply_reconciliation(
        &self,
        property_id: &str,
        upserts: &[ReservationUpsert],
        delete_codes: &[String],
    ) -> DomainResult<usize> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(GuestLinkError::Persistence("disk I/O error at /data/guestlink.db".into()));
        }

        let mut state = self.state.lock().unwrap();
        let now = Utc::now().timestamp();

        for row in upserts {
            let position = state
                .reservations
                .iter()
                .position(|r| r.property_id == row.property_id && r.external_code == row.external_code);
            match position {
                Some(idx) => {
                    let stored = &mut state.reservations[idx];
                    stored.start_date = row.start_date;
                    stored.end_date = row.end_date;
                    stored.guest_name = row.guest_name.clone();
                    stored.guest_count = row.guest_count;
                    stored.summary = row.summary.clone();
                    stored.metadata = row.metadata.clone();
                    stored.updated_at = now;
                }
                None => {
                    let id = format!("res-{}", state.reservations.len() + 1);
                    state.reservations.push(StoredReservation {
                        id,
                        property_id: row.property_id.clone(),
                        external_code: row.external_code.clone(),
                        start_date: row.start_date,
                        end_date: row.end_date,
                        guest_name: row.guest_name.clone(),
                        guest_count: row.guest_count,
                        summary: row.summary.clone(),
                        metadata: row.metadata.clone(),
                        created_at: now,
                        updated_at: now,
                    });
                }
            }
        }

        let before = state.reservations.len();
        state
            .reservations
            .retain(|r| !(r.property_id == property_id && delete_codes.contains(&r.external_code)));
        Ok(before - state.reservations.len())
    }
}

#[async_trait]
impl ValidatedBookingRepository for InMemoryStore {
    async fn list_for_property(&self, property_id: &str) -> DomainResult<Vec<ValidatedBooking>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .bookings
            .iter()
            .filter(|b| b.property_id == property_id)
            .cloned()
            .collect())
    }

    async fn record_validated_booking(&self, booking: &ValidatedBooking) -> DomainResult<()> {
        let mut state = self.state.lock().unwrap();
        state.bookings.retain(|b| {
            !(b.property_id == booking.property_id && b.booking_code == booking.booking_code)
        });
        state.bookings.push(booking.clone());
        Ok(())
    }
}

#[async_trait]
impl SyncStatusRepository for InMemoryStore {
    async fn get_status(&self, property_id: &str) -> DomainResult<Option<SyncStatus>> {
        Ok(self.status(property_id))
    }

    async fn save_status(&self, status: &SyncStatus) -> DomainResult<()> {
        self.set_status(status.clone());
        Ok(())
    }
}

#[async_trait]
impl TokenRepository for InMemoryStore {
    async fn replace_active_manual(&self, token: &NewVerificationToken) -> DomainResult<usize> {
        let mut state = self.state.lock().unwrap();
        let mut deactivated = 0;
        for existing in state.tokens.iter_mut().filter(|t| {
            t.property_id == token.property_id && t.source == TokenSource::Manual && t.is_active
        }) {
            existing.is_active = false;
            deactivated += 1;
        }

        state.tokens.push(VerificationToken {
            id: token.id.clone(),
            token: token.token.clone(),
            property_id: token.property_id.clone(),
            booking_id: token.booking_id.clone(),
            external_code: token.external_code.clone(),
            access_code_hash: token.access_code_hash.clone(),
            source: TokenSource::Manual,
            is_active: true,
            expires_at: token.expires_at,
            used_count: 0,
            last_used_at: None,
            created_at: token.created_at,
        });
        Ok(deactivated)
    }

    async fn find_by_token(&self, token: &str) -> DomainResult<Option<VerificationToken>> {
        Ok(self.state.lock().unwrap().tokens.iter().find(|t| t.token == token).cloned())
    }

    async fn record_usage(&self, token_id: &str, used_at: DateTime<Utc>) -> DomainResult<()> {
        if self.fail_usage_updates.load(Ordering::SeqCst) {
            return Err(GuestLinkError::Persistence("database is locked".into()));
        }
        let mut state = self.state.lock().unwrap();
        if let Some(token) = state.tokens.iter_mut().find(|t| t.id == token_id) {
            token.used_count += 1;
            token.last_used_at = Some(used_at);
        }
        Ok(())
    }

    async fn upsert_auto_token(&self, spec: &AutoTokenSpec) -> DomainResult<AutoTokenOutcome> {
        let mut state = self.state.lock().unwrap();
        let existing = state.tokens.iter().position(|t| {
            t.source == TokenSource::Auto
                && t.property_id == spec.property_id
                && t.external_code.as_deref() == Some(spec.external_code.as_str())
        });

        if let Some(idx) = existing {
            let token = &mut state.tokens[idx];
            token.expires_at = spec.expires_at;
            token.access_code_hash = Some(spec.access_code_hash.clone());
            token.is_active = true;
            return Ok(AutoTokenOutcome::Refreshed);
        }

        state.tokens.push(VerificationToken {
            id: spec.id.clone(),
            token: spec.token.clone(),
            property_id: spec.property_id.clone(),
            booking_id: None,
            external_code: Some(spec.external_code.clone()),
            access_code_hash: Some(spec.access_code_hash.clone()),
            source: TokenSource::Auto,
            is_active: true,
            expires_at: spec.expires_at,
            used_count: 0,
            last_used_at: None,
            created_at: spec.created_at,
        });
        Ok(AutoTokenOutcome::Created)
    }

    async fn deactivate_manual(&self, property_id: &str) -> DomainResult<usize> {
        let mut state = self.state.lock().unwrap();
        let mut count = 0;
        for token in state.tokens.iter_mut().filter(|t| {
            t.property_id == property_id && t.source == TokenSource::Manual && t.is_active
        }) {
            token.is_active = false;
            count += 1;
        }
        Ok(count)
    }

    async fn find_active_manual(&self, property_id: &str) -> DomainResult<Option<VerificationToken>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .tokens
            .iter()
            .find(|t| t.property_id == property_id && t.source == TokenSource::Manual && t.is_active)
            .cloned())
    }
}

/// Feed source returning scripted responses, repeating the last one.
pub struct ScriptedFeed {
    name: &'static str,
    responses: Mutex<VecDeque<DomainResult<String>>>,
    last: Mutex<Option<DomainResult<String>>>,
    calls: AtomicUsize,
}

impl ScriptedFeed {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            responses: Mutex::new(VecDeque::new()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn returning(name: &'static str, body: impl Into<String>) -> Arc<Self> {
        let feed = Self::new(name);
        feed.push(Ok(body.into()));
        Arc::new(feed)
    }

    pub fn failing(name: &'static str, error: GuestLinkError) -> Arc<Self> {
        let feed = Self::new(name);
        feed.push(Err(error));
        Arc::new(feed)
    }

    pub fn push(&self, response: DomainResult<String>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedSource for ScriptedFeed {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, _url: &str) -> DomainResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(response) => {
                *self.last.lock().unwrap() = Some(response.clone());
                response
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Err(GuestLinkError::Network("no scripted response".into()))),
        }
    }
}

/// Policy answering with a fixed decision or failure.
pub struct StaticPolicy {
    answer: DomainResult<PolicyDecision>,
}

impl StaticPolicy {
    pub fn allow() -> Arc<Self> {
        Arc::new(Self { answer: Ok(PolicyDecision::allow()) })
    }

    pub fn deny(reason: &str) -> Arc<Self> {
        Arc::new(Self { answer: Ok(PolicyDecision::deny(reason)) })
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self { answer: Err(GuestLinkError::Network("policy service timed out".into())) })
    }
}

#[async_trait]
impl ReservationPolicy for StaticPolicy {
    async fn check_allowed(&self, _property_id: &str) -> DomainResult<PolicyDecision> {
        self.answer.clone()
    }
}

/// Pepper provider with a fixed value.
pub struct FixedPepper(pub Option<&'static str>);

impl FixedPepper {
    pub fn some() -> Arc<Self> {
        Arc::new(Self(Some("integration-test-pepper")))
    }

    pub fn none() -> Arc<Self> {
        Arc::new(Self(None))
    }
}

impl PepperProvider for FixedPepper {
    fn pepper(&self) -> Option<Pepper> {
        self.0.and_then(Pepper::new)
    }
}
