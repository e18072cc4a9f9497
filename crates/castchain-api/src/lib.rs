//! Castchain — HTTP and WebSocket transport.
//!
//! Exposes the session commands and queries over JSON, and streams each
//! session's events to its participants over a WebSocket.

pub mod config;
pub mod error;
pub mod hub;
pub mod routes;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// Builds the application router with every route group mounted.
pub fn app(app_state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/sessions", routes::sessions::router())
        .nest("/api/v1/catalog", routes::catalog::router())
        .with_state(app_state)
}
