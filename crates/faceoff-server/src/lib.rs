pub mod api;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod health;
pub mod index;
pub mod notifier;
pub mod sse;
pub mod state;
pub mod store;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;

use config::ServerConfig;
use state::AppState;

/// Build the Axum router and application state from a config.
pub fn build_app(config: ServerConfig) -> (Router<()>, AppState) {
    let state = AppState::new(config);

    let api_routes = Router::new()
        .route("/rooms/join", post(api::join_room))
        .route("/rooms/leave", post(api::leave_room))
        .route("/rooms/{room_id}", get(api::get_room))
        .route("/rooms/{room_id}/stream", get(sse::match_stream));

    let app = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api/v1", api_routes)
        .layer(CorsLayer::permissive())
        .with_state(state.clone());

    (app, state)
}
