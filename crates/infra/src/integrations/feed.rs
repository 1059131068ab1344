//! Calendar feed sources
//!
//! [`HttpFeedSource`] requests the feed URL directly. [`ProxyFeedSource`]
//! requests `{proxy}?url=<encoded feed url>` through a passthrough proxy and
//! serves as the fallback when the direct request cannot connect.

use async_trait::async_trait;
use guestlink_core::FeedSource;
use guestlink_domain::{GuestLinkError, Result};
use tracing::debug;
use url::Url;

use crate::http::HttpClient;

fn parse_feed_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|_| GuestLinkError::Validation("calendar feed URL is not a valid URL".into()))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(GuestLinkError::Validation(format!(
            "calendar feed URL scheme '{other}' is not supported"
        ))),
    }
}

/// Fetches the feed URL as given.
#[derive(Clone)]
pub struct HttpFeedSource {
    client: HttpClient,
}

impl HttpFeedSource {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let url = parse_feed_url(url)?;
        let body = self.client.get_text(url.as_str()).await?;
        debug!(bytes = body.len(), host = url.host_str().unwrap_or_default(), "feed fetched");
        Ok(body)
    }
}

/// Fetches the feed through a passthrough proxy.
#[derive(Clone)]
pub struct ProxyFeedSource {
    client: HttpClient,
    base: Url,
}

impl ProxyFeedSource {
    pub fn new(client: HttpClient, proxy_url: &str) -> Result<Self> {
        let base = Url::parse(proxy_url.trim())
            .map_err(|_| GuestLinkError::Config("feed proxy URL is not a valid URL".into()))?;
        Ok(Self { client, base })
    }

    fn proxied(&self, feed_url: &Url) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut().append_pair("url", feed_url.as_str());
        url
    }
}

#[async_trait]
impl FeedSource for ProxyFeedSource {
    fn name(&self) -> &'static str {
        "proxy"
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let feed_url = parse_feed_url(url)?;
        let body = self.client.get_text(self.proxied(&feed_url).as_str()).await?;
        debug!(bytes = body.len(), "feed fetched through proxy");
        Ok(body)
    }
}
