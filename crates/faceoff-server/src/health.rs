use std::sync::atomic::Ordering;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

/// Structured health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub connections: ConnectionInfo,
    pub rooms: RoomInfo,
}

#[derive(Serialize)]
pub struct ConnectionInfo {
    pub sse: usize,
}

#[derive(Serialize)]
pub struct RoomInfo {
    pub live: usize,
    pub waiting: usize,
    pub matched: usize,
}

/// GET /health — server status, subscriber counts, and room counts.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let sse = state.sse_subscriber_count.load(Ordering::Relaxed);
    let stats = state.store.stats().unwrap_or_default();

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        connections: ConnectionInfo { sse },
        rooms: RoomInfo {
            live: stats.live,
            waiting: stats.waiting,
            matched: stats.matched,
        },
    })
}

/// GET /ready — verifies the room store answers.
pub async fn readiness_check(State(state): State<AppState>) -> &'static str {
    if state.store.stats().is_err() {
        return "not ready: store unavailable";
    }
    "ready"
}
