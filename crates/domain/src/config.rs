//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_AUTO_TOKEN_GRACE_DAYS, DEFAULT_SYNC_THROTTLE_SECS, DEFAULT_TOKEN_EXPIRES_IN_DAYS,
    MAX_TOKEN_EXPIRES_IN_DAYS,
};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub tokens: TokenConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "guestlink.db".to_string(), pool_size: 8 }
    }
}

/// Calendar sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// A successful run inside this window makes the next unforced run a no-op.
    pub throttle_seconds: u64,
    /// Days added to a reservation's end date for auto-issued tokens.
    pub auto_token_grace_days: i64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            throttle_seconds: DEFAULT_SYNC_THROTTLE_SECS,
            auto_token_grace_days: DEFAULT_AUTO_TOKEN_GRACE_DAYS,
        }
    }
}

/// Verification token configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    pub default_expires_in_days: i64,
    pub max_expires_in_days: i64,
    /// Issue tokens when the reservation-control policy cannot be reached.
    pub policy_fail_open: bool,
    #[serde(default, skip_serializing)]
    pub pepper: Option<String>,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            default_expires_in_days: DEFAULT_TOKEN_EXPIRES_IN_DAYS,
            max_expires_in_days: MAX_TOKEN_EXPIRES_IN_DAYS,
            policy_fail_open: true,
            pepper: None,
        }
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("default_expires_in_days", &self.default_expires_in_days)
            .field("max_expires_in_days", &self.max_expires_in_days)
            .field("policy_fail_open", &self.policy_fail_open)
            .field("pepper", &self.pepper.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Calendar feed fetching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub timeout_seconds: u64,
    /// Base URL of a passthrough proxy; the feed URL is appended as `url=`.
    #[serde(default)]
    pub proxy_url: Option<String>,
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            proxy_url: None,
            user_agent: concat!("guestlink/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_config_debug_redacts_pepper() {
        let config = TokenConfig { pepper: Some("super-secret".into()), ..TokenConfig::default() };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn pepper_is_never_serialized() {
        let config = TokenConfig { pepper: Some("super-secret".into()), ..TokenConfig::default() };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("super-secret"));
    }

    #[test]
    fn sections_default_when_missing() {
        let config: Config =
            serde_json::from_str(r#"{"database":{"path":"x.db","pool_size":2}}"#).unwrap();
        assert_eq!(config.sync.throttle_seconds, DEFAULT_SYNC_THROTTLE_SECS);
        assert!(config.tokens.policy_fail_open);
        assert!(config.feed.proxy_url.is_none());
    }
}
