//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use castchain_catalog::CatalogGateway;
use castchain_chain::Role;
use castchain_core::clock::Clock;
use castchain_core::rng::DeterministicRng;
use castchain_event_store::InMemoryEventRepository;
use castchain_test_support::{
    FixedClock, MockRng, StaticCatalog, cast_member, supporting_roster,
};
use http_body_util::BodyExt;
use tokio::sync::Mutex;
use tower::ServiceExt;

use castchain_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// A small catalog whose casts chain 1 → 2 → 3 → 4 through shared persons.
pub fn test_catalog() -> StaticCatalog {
    StaticCatalog::new()
        .with_roster(1, supporting_roster(&[10, 11]))
        .with_roster(
            2,
            vec![
                cast_member(11, "Lead", Role::Main),
                cast_member(12, "Friend", Role::Supporting),
            ],
        )
        .with_roster(3, supporting_roster(&[11, 13]))
        .with_roster(4, supporting_roster(&[11, 12]))
        .with_roster(5, supporting_roster(&[11]))
}

/// State over an in-memory event log with a deterministic Clock/RNG.
pub fn test_state_with_rng(rng: impl DeterministicRng + 'static) -> AppState {
    let rng: Arc<Mutex<dyn DeterministicRng>> = Arc::new(Mutex::new(rng));
    let catalog: Arc<dyn CatalogGateway> = Arc::new(test_catalog());
    AppState::new(
        fixed_clock(),
        rng,
        Arc::new(InMemoryEventRepository::new()),
        catalog,
    )
}

pub fn test_state() -> AppState {
    test_state_with_rng(MockRng)
}

/// Build the full app with an in-memory event log and deterministic
/// Clock/RNG. Uses the same route structure as `main.rs`.
pub fn build_test_app() -> Router {
    castchain_api::app(test_state())
}

/// Build the full app with a custom RNG for tests that need a
/// deterministic opening side.
pub fn build_test_app_with_rng(rng: impl DeterministicRng + 'static) -> Router {
    castchain_api::app(test_state_with_rng(rng))
}

/// Serves the app for `state` on an ephemeral local port.
pub async fn serve(state: AppState) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = castchain_api::app(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: &Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a DELETE request and return the status.
pub async fn delete(app: &Router, uri: &str) -> StatusCode {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await.0
}
