//! Castchain API server entry point.

use std::error::Error;
use std::sync::Arc;

use castchain_api::config::AppConfig;
use castchain_api::state::AppState;
use castchain_catalog::{CatalogGateway, JikanCatalog};
use castchain_core::clock::{Clock, SystemClock};
use castchain_core::repository::EventRepository;
use castchain_core::rng::{DeterministicRng, StdRngSource};
use castchain_event_store::InMemoryEventRepository;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Castchain API server");

    let config = AppConfig::from_env()?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let rng: Arc<Mutex<dyn DeterministicRng>> = Arc::new(Mutex::new(StdRngSource::from_os()));
    let event_repository: Arc<dyn EventRepository> = Arc::new(InMemoryEventRepository::new());
    let catalog: Arc<dyn CatalogGateway> = Arc::new(JikanCatalog::new(
        &config.catalog_base_url,
        &config.catalog_language,
        config.catalog_timeout,
    ));
    let app_state = AppState::new(clock, rng, event_repository, catalog)
        .with_ended_session_ttl(config.ended_session_ttl);

    // TODO: Replace CorsLayer::permissive() with the web client's origin once it is hosted.
    let app = castchain_api::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.socket_addr()?;
    tracing::info!(catalog = %config.catalog_base_url, "Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
