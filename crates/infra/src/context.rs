//! Composition root
//!
//! Builds the SQLite store, feed sources and services from a [`Config`].

use std::sync::Arc;

use guestlink_core::{
    AutoTokenGenerator, FallbackFetcher, FeedSource, SyncService, SyncStatusTracker, TokenService,
    TokenSettings,
};
use guestlink_domain::{Config, Result};
use tracing::info;

use crate::config::validate;
use crate::database::{
    DbManager, SqliteBookingRepository, SqlitePolicyRepository, SqlitePropertyRepository,
    SqliteReservationRepository, SqliteSyncStatusRepository, SqliteTokenRepository,
};
use crate::http::HttpClient;
use crate::integrations::feed::{HttpFeedSource, ProxyFeedSource};
use crate::pepper::ConfigPepperProvider;

/// Everything a front end needs, wired once at startup.
pub struct GuestLinkContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub properties: Arc<SqlitePropertyRepository>,
    pub bookings: Arc<SqliteBookingRepository>,
    pub policies: Arc<SqlitePolicyRepository>,
    pub pepper: Arc<ConfigPepperProvider>,
    pub sync: Arc<SyncService>,
    pub tokens: Arc<TokenService>,
}

impl GuestLinkContext {
    /// Validate the configuration, open the database, run migrations and
    /// wire the services.
    ///
    /// # Errors
    /// Fails on an invalid configuration, when the database cannot be opened
    /// or when the feed proxy URL is invalid.
    pub fn from_config(config: Config) -> Result<Self> {
        validate(&config)?;
        let db = Arc::new(DbManager::open(&config.database)?);

        let properties = Arc::new(SqlitePropertyRepository::new(Arc::clone(&db)));
        let reservations = Arc::new(SqliteReservationRepository::new(Arc::clone(&db)));
        let bookings = Arc::new(SqliteBookingRepository::new(Arc::clone(&db)));
        let statuses = Arc::new(SqliteSyncStatusRepository::new(Arc::clone(&db)));
        let tokens_repo = Arc::new(SqliteTokenRepository::new(Arc::clone(&db)));
        let policies = Arc::new(SqlitePolicyRepository::new(Arc::clone(&db)));
        let pepper = Arc::new(ConfigPepperProvider::from_config(&config.tokens));

        let fetcher = build_fetcher(&config)?;
        let generator = AutoTokenGenerator::new(
            tokens_repo.clone(),
            pepper.clone(),
            config.sync.auto_token_grace_days,
        );
        let sync = SyncService::new(
            properties.clone(),
            reservations,
            bookings.clone(),
            fetcher,
            SyncStatusTracker::new(statuses, config.sync.throttle_seconds),
        )
        .with_auto_tokens(generator);

        let tokens = TokenService::new(
            tokens_repo,
            policies.clone(),
            pepper.clone(),
            TokenSettings::from(&config.tokens),
        );

        info!(
            db_path = %db.path().display(),
            proxy = config.feed.proxy_url.is_some(),
            policy_fail_open = config.tokens.policy_fail_open,
            "guestlink context ready"
        );

        Ok(Self {
            config,
            db,
            properties,
            bookings,
            policies,
            pepper,
            sync: Arc::new(sync),
            tokens: Arc::new(tokens),
        })
    }
}

fn build_fetcher(config: &Config) -> Result<FallbackFetcher> {
    let client = HttpClient::for_feeds(&config.feed)?;
    let direct: Arc<dyn FeedSource> = Arc::new(HttpFeedSource::new(client.clone()));
    let fetcher = FallbackFetcher::new(direct);

    match config.feed.proxy_url.as_deref().filter(|url| !url.trim().is_empty()) {
        Some(proxy_url) => {
            let proxy: Arc<dyn FeedSource> = Arc::new(ProxyFeedSource::new(client, proxy_url)?);
            Ok(fetcher.with_fallback(proxy))
        }
        None => Ok(fetcher),
    }
}
