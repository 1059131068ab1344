//! Guest link issuance and resolution endpoints

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use guestlink_domain::{IssueTokenRequest, IssuedToken, ResolveTokenRequest, ResolvedToken};

use super::{json_body, ApiError};
use crate::state::AppState;
use crate::utils::logging::log_operation;

pub fn router() -> Router<AppState> {
    Router::new().route("/tokens", post(issue_token)).route("/tokens/resolve", post(resolve_token))
}

/// POST /tokens - issue a manual link, replacing the active one
async fn issue_token(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<IssuedToken>), ApiError> {
    let request: IssueTokenRequest = json_body(&body)?;

    let started = Instant::now();
    let result = state.ctx.tokens.issue(request).await;
    log_operation("issue_token", started.elapsed(), &result);

    Ok((StatusCode::CREATED, Json(result?)))
}

/// POST /tokens/resolve - check a guest link, optionally with an access code
async fn resolve_token(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ResolvedToken>, ApiError> {
    let request: ResolveTokenRequest = json_body(&body)?;

    let started = Instant::now();
    let result = state.ctx.tokens.resolve(request).await;
    log_operation("resolve_token", started.elapsed(), &result);

    Ok(Json(result?))
}
