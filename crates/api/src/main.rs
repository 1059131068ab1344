//! GuestLink HTTP server
//!
//! Loads configuration, initialises tracing, wires the context and serves
//! the API on `GUESTLINK_BIND_ADDR` (default `127.0.0.1:8080`).

use std::net::SocketAddr;

use anyhow::{Context, Result};
use guestlink_api::{build_router, AppState};
use guestlink_infra::{config, observability, GuestLinkContext};
use tracing::{info, warn};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is normal outside development.
    let dotenv = dotenvy::dotenv();

    let config = config::load()?;
    observability::init_tracing(&config.logging)?;
    if let Err(err) = dotenv {
        if !err.not_found() {
            warn!(error = %err, "could not read .env file");
        }
    }

    let bind_addr: SocketAddr = std::env::var("GUESTLINK_BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()
        .context("GUESTLINK_BIND_ADDR must be a socket address")?;

    let ctx = GuestLinkContext::from_config(config)?;
    let app = build_router(AppState::new(ctx));

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!(%bind_addr, "guestlink listening");
    axum::serve(listener, app).await?;

    Ok(())
}
