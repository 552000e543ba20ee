use std::time::Instant;

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct LivenessResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct DatabaseHealth {
    connected: bool,
    latency_ms: u128,
}

#[derive(Serialize)]
struct ReadinessResponse {
    status: &'static str,
    version: &'static str,
    database: DatabaseHealth,
}

/// `GET /health` — liveness probe, never touches the database.
async fn liveness() -> impl IntoResponse {
    Json(LivenessResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /api/health` — readiness probe including a database ping.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();
    let connected = state.db.ping().await.is_ok();
    let latency_ms = started.elapsed().as_millis();

    if !connected {
        tracing::warn!("Health check: database ping failed");
    }

    Json(ReadinessResponse {
        status: if connected { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database: DatabaseHealth {
            connected,
            latency_ms,
        },
    })
}

pub fn root_router() -> Router<AppState> {
    Router::new().route("/health", get(liveness))
}

pub fn api_router() -> Router<AppState> {
    Router::new().route("/health", get(readiness))
}
