//! Feed retrieval with a proxy fallback chain.
//!
//! The direct source is tried first. Only a connection-level failure moves on
//! to the fallback; an HTTP error from a reachable server is final.

use std::sync::Arc;

use guestlink_domain::{GuestLinkError, Result};
use tracing::{debug, instrument, warn};

use super::ports::FeedSource;

pub struct FallbackFetcher {
    primary: Arc<dyn FeedSource>,
    fallback: Option<Arc<dyn FeedSource>>,
}

impl FallbackFetcher {
    pub fn new(primary: Arc<dyn FeedSource>) -> Self {
        Self { primary, fallback: None }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn FeedSource>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Fetch raw feed text. With `force_proxy` the direct attempt is skipped.
    ///
    /// Connection failures leave this function as `UpstreamFetch`.
    #[instrument(skip(self, url))]
    pub async fn fetch(&self, url: &str, force_proxy: bool) -> Result<String> {
        if force_proxy {
            let fallback = self.fallback.as_ref().ok_or_else(|| {
                GuestLinkError::Config("proxy fetch requested but no proxy is configured".into())
            })?;
            return fallback.fetch(url).await.map_err(into_upstream);
        }

        match self.primary.fetch(url).await {
            Ok(body) => Ok(body),
            Err(err) if err.is_connection_failure() => match &self.fallback {
                Some(fallback) => {
                    warn!(
                        source = self.primary.name(),
                        fallback = fallback.name(),
                        error_type = err.label(),
                        "direct feed fetch failed to connect, retrying via proxy"
                    );
                    let body = fallback.fetch(url).await.map_err(into_upstream)?;
                    debug!(bytes = body.len(), "proxy fetch succeeded");
                    Ok(body)
                }
                None => Err(into_upstream(err)),
            },
            Err(err) => Err(into_upstream(err)),
        }
    }
}

fn into_upstream(err: GuestLinkError) -> GuestLinkError {
    match err {
        GuestLinkError::Network(message) => {
            GuestLinkError::UpstreamFetch(format!("feed unreachable: {message}"))
        }
        other => other,
    }
}
