use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;
use crate::utils::health::{ComponentHealth, HealthStatus};

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// GET /health - database reachability and pepper presence
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let db = state.ctx.db.clone();
    let database = match tokio::task::spawn_blocking(move || db.health_check()).await {
        Ok(Ok(())) => ComponentHealth::healthy("database"),
        Ok(Err(err)) => ComponentHealth::unhealthy("database", err.label()),
        Err(_) => ComponentHealth::unhealthy("database", "health check aborted"),
    };

    let pepper = if state.ctx.pepper.is_configured() {
        ComponentHealth::healthy("pepper")
    } else {
        ComponentHealth::unhealthy("pepper", "not configured")
    };

    let mut status = HealthStatus::new().add_component(database).add_component(pepper);
    status.calculate_score();

    let code = if status.is_healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (code, Json(status))
}
