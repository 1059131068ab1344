//! Property registration, sync and link administration endpoints

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use guestlink_core::PropertyRepository;
use guestlink_domain::{
    validate_property_id, GuestLinkError, Property, SyncOptions, SyncOutcome, SyncStatus,
    TokenSummary,
};
use serde::{Deserialize, Serialize};

use super::{json_body, json_or_default, ApiError};
use crate::state::AppState;
use crate::utils::logging::log_operation;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/properties/{id}", put(register_property))
        .route("/properties/{id}/sync", get(sync_status).post(run_sync))
        .route("/properties/{id}/token", get(active_token))
        .route("/properties/{id}/tokens", delete(revoke_tokens))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPropertyRequest {
    pub name: String,
    #[serde(default)]
    pub ical_url: Option<String>,
}

/// Registered property; the feed URL is a secret and is not echoed.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyResponse {
    pub id: String,
    pub name: String,
    pub has_feed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RevokeResponse {
    pub revoked: usize,
}

/// PUT /properties/{id} - create or update a property
async fn register_property(
    State(state): State<AppState>,
    Path(property_id): Path<String>,
    body: Bytes,
) -> Result<Json<PropertyResponse>, ApiError> {
    let request: RegisterPropertyRequest = json_body(&body)?;
    let id = validate_property_id(&property_id)?;
    let name = request.name.trim();
    if name.is_empty() {
        return Err(GuestLinkError::Validation("property name is required".into()).into());
    }

    let property = Property {
        id,
        name: name.to_string(),
        ical_url: request.ical_url.map(|url| url.trim().to_string()).filter(|url| !url.is_empty()),
    };
    state.ctx.properties.upsert_property(&property).await?;

    Ok(Json(PropertyResponse {
        has_feed: property.ical_url.is_some(),
        id: property.id,
        name: property.name,
    }))
}

/// POST /properties/{id}/sync - run one sync pass; the body is optional
async fn run_sync(
    State(state): State<AppState>,
    Path(property_id): Path<String>,
    body: Bytes,
) -> Result<Json<SyncOutcome>, ApiError> {
    let options: SyncOptions = json_or_default(&body)?;

    let started = Instant::now();
    let result = state.ctx.sync.sync(&property_id, options).await;
    log_operation("sync", started.elapsed(), &result);

    Ok(Json(result?))
}

/// GET /properties/{id}/sync - last recorded sync status
async fn sync_status(
    State(state): State<AppState>,
    Path(property_id): Path<String>,
) -> Result<Json<SyncStatus>, ApiError> {
    Ok(Json(state.ctx.sync.status(&property_id).await?))
}

/// GET /properties/{id}/token - metadata of the active manual link
async fn active_token(
    State(state): State<AppState>,
    Path(property_id): Path<String>,
) -> Result<Json<TokenSummary>, ApiError> {
    state
        .ctx
        .tokens
        .active_token_for_property(&property_id)
        .await?
        .map(Json)
        .ok_or_else(|| GuestLinkError::NotFound("no active link for this property".into()).into())
}

/// DELETE /properties/{id}/tokens - deactivate every manual link
async fn revoke_tokens(
    State(state): State<AppState>,
    Path(property_id): Path<String>,
) -> Result<Json<RevokeResponse>, ApiError> {
    let started = Instant::now();
    let result = state.ctx.tokens.revoke_for_property(&property_id).await;
    log_operation("revoke_tokens", started.elapsed(), &result);

    Ok(Json(RevokeResponse { revoked: result? }))
}
