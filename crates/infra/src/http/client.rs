use std::time::Duration;

use guestlink_domain::{FeedConfig, GuestLinkError, Result};
use reqwest::Client as ReqwestClient;
use tracing::debug;

use crate::errors::{map_http_error, status_message};

/// HTTP client with a request timeout.
///
/// Request URLs are never logged in full: calendar feed URLs embed access
/// secrets. Only the host appears in traces.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Client configured from the feed section.
    pub fn for_feeds(config: &FeedConfig) -> Result<Self> {
        Self::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.max(1)))
            .user_agent(config.user_agent.clone())
            .build()
    }

    /// GET a text body. A non-success status is a final `UpstreamFetch`.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let request = self.client.get(url).build().map_err(map_http_error)?;
        let host = request.url().host_str().unwrap_or_default().to_string();
        debug!(%host, "sending HTTP request");

        let response = self.client.execute(request).await.map_err(|err| {
            let err = err.without_url();
            debug!(%host, error = %err, "HTTP request failed");
            map_http_error(err)
        })?;

        let status = response.status();
        debug!(%host, %status, "received HTTP response");
        if !status.is_success() {
            return Err(GuestLinkError::UpstreamFetch(status_message(status)));
        }

        response.text().await.map_err(map_http_error)
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), user_agent: None }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(map_http_error)?;
        Ok(HttpClient { client })
    }
}
