//! Service heartbeat.
//!
//! Besides liveness, the heartbeat reports whether reviews come from the
//! real provider or the fixed mock, so a misconfigured
//! `REVIEWD_MOCK_REVIEWS` shows up in monitoring instead of in stored rows.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health))]
pub struct HealthApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

/// Heartbeat (`GET /health`).
///
/// Answers HTTP 200 whenever the process is up. `review_mode` is
/// `"provider"` in normal operation and `"mock"` when mock reviews are
/// enabled.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = Value)
    )
)]
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let review_mode = if state.config.mock_reviews {
        "mock"
    } else {
        "provider"
    };
    Json(json!({
        "status":      "ok",
        "version":     env!("CARGO_PKG_VERSION"),
        "review_mode": review_mode,
    }))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
