//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Environment variables, when `GUESTLINK_DB_PATH` is set
//! 2. Otherwise a config file: `GUESTLINK_CONFIG` if set, else the first file
//!    found by [`probe_config_paths`]
//! 3. Otherwise built-in defaults
//!
//! The pepper is a secret and is usually kept out of files, so
//! `GUESTLINK_TOKEN_PEPPER` always overrides whatever the chosen source set.
//!
//! ## Environment Variables
//! - `GUESTLINK_DB_PATH`: Database file path (required for env loading)
//! - `GUESTLINK_DB_POOL_SIZE`: Connection pool size
//! - `GUESTLINK_SYNC_THROTTLE_SECONDS`: Throttle window for unforced syncs
//! - `GUESTLINK_AUTO_TOKEN_GRACE_DAYS`: Days added to checkout for auto tokens
//! - `GUESTLINK_TOKEN_DEFAULT_DAYS` / `GUESTLINK_TOKEN_MAX_DAYS`: Manual expiry
//! - `GUESTLINK_POLICY_FAIL_OPEN`: Issue tokens when the policy is unreachable
//! - `GUESTLINK_TOKEN_PEPPER`: Access-code hashing secret
//! - `GUESTLINK_FEED_TIMEOUT_SECONDS`, `GUESTLINK_FEED_PROXY_URL`,
//!   `GUESTLINK_FEED_USER_AGENT`: Feed fetching
//! - `GUESTLINK_LOG_LEVEL`, `GUESTLINK_LOG_JSON`: Logging
//!
//! ## File Locations
//! 1. `./guestlink.{toml,json}` or `./config.{toml,json}`
//! 2. The same names one and two directories up
//! 3. Next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use guestlink_domain::constants::MAX_CONFIGURED_DAYS;
use guestlink_domain::{Config, DatabaseConfig, GuestLinkError, Result};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["guestlink.toml", "guestlink.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy.
///
/// # Errors
/// Returns `GuestLinkError::Config` when the selected source is malformed or
/// the resulting configuration is inconsistent.
pub fn load() -> Result<Config> {
    let mut config = if std::env::var("GUESTLINK_DB_PATH").is_ok() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        config
    } else {
        let explicit = std::env::var("GUESTLINK_CONFIG").ok().map(PathBuf::from);
        match explicit.or_else(probe_config_paths) {
            Some(path) => load_from_file(Some(path))?,
            None => {
                tracing::warn!("No configuration found, using defaults");
                Config::default()
            }
        }
    };

    if let Some(pepper) = env_opt("GUESTLINK_TOKEN_PEPPER") {
        config.tokens.pepper = Some(pepper);
    }

    validate(&config)?;
    Ok(config)
}

/// Load configuration from environment variables.
///
/// `GUESTLINK_DB_PATH` is required; every other variable falls back to its
/// default.
///
/// # Errors
/// Returns `GuestLinkError::Config` if the database path is missing or any
/// value fails to parse.
pub fn load_from_env() -> Result<Config> {
    let defaults = Config::default();

    let database = DatabaseConfig {
        path: env_var("GUESTLINK_DB_PATH")?,
        pool_size: env_parse("GUESTLINK_DB_POOL_SIZE", defaults.database.pool_size)?,
    };

    let mut config = Config { database, ..defaults };

    config.sync.throttle_seconds =
        env_parse("GUESTLINK_SYNC_THROTTLE_SECONDS", config.sync.throttle_seconds)?;
    config.sync.auto_token_grace_days =
        env_parse("GUESTLINK_AUTO_TOKEN_GRACE_DAYS", config.sync.auto_token_grace_days)?;

    config.tokens.default_expires_in_days =
        env_parse("GUESTLINK_TOKEN_DEFAULT_DAYS", config.tokens.default_expires_in_days)?;
    config.tokens.max_expires_in_days =
        env_parse("GUESTLINK_TOKEN_MAX_DAYS", config.tokens.max_expires_in_days)?;
    config.tokens.policy_fail_open =
        env_bool("GUESTLINK_POLICY_FAIL_OPEN", config.tokens.policy_fail_open);
    config.tokens.pepper = env_opt("GUESTLINK_TOKEN_PEPPER");

    config.feed.timeout_seconds =
        env_parse("GUESTLINK_FEED_TIMEOUT_SECONDS", config.feed.timeout_seconds)?;
    config.feed.proxy_url = env_opt("GUESTLINK_FEED_PROXY_URL");
    if let Some(agent) = env_opt("GUESTLINK_FEED_USER_AGENT") {
        config.feed.user_agent = agent;
    }

    if let Some(level) = env_opt("GUESTLINK_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("GUESTLINK_LOG_JSON", config.logging.json);

    Ok(config)
}

/// Load configuration from a file.
///
/// If `path` is `None`, probes the standard locations. Format is picked by
/// extension (`.toml` or `.json`).
///
/// # Errors
/// Returns `GuestLinkError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(GuestLinkError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            GuestLinkError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| GuestLinkError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| GuestLinkError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| GuestLinkError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(GuestLinkError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Cross-field checks the serde layer cannot express.
pub fn validate(config: &Config) -> Result<()> {
    if config.database.path.trim().is_empty() {
        return Err(GuestLinkError::Config("database.path must not be empty".into()));
    }
    if config.database.pool_size == 0 {
        return Err(GuestLinkError::Config("database.pool_size must be at least 1".into()));
    }

    let tokens = &config.tokens;
    if !(1..=MAX_CONFIGURED_DAYS).contains(&tokens.max_expires_in_days) {
        return Err(GuestLinkError::Config(format!(
            "tokens.max_expires_in_days must be between 1 and {MAX_CONFIGURED_DAYS}"
        )));
    }
    if !(1..=tokens.max_expires_in_days).contains(&tokens.default_expires_in_days) {
        return Err(GuestLinkError::Config(
            "tokens.default_expires_in_days must be between 1 and max_expires_in_days".into(),
        ));
    }
    if !(0..=MAX_CONFIGURED_DAYS).contains(&config.sync.auto_token_grace_days) {
        return Err(GuestLinkError::Config(format!(
            "sync.auto_token_grace_days must be between 0 and {MAX_CONFIGURED_DAYS}"
        )));
    }

    Ok(())
}

/// Probe the standard locations and return the first existing config file.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join(".."));
        dirs.push(cwd.join("../.."));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        GuestLinkError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Set and non-blank
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| GuestLinkError::Config(format!("Invalid value for {key}: {e}"))),
        None => Ok(default),
    }
}

/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
