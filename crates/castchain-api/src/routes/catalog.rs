//! Catalog passthrough for item titles and artwork.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use castchain_catalog::ItemDisplay;
use castchain_chain::ItemId;
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /{item_id}
#[instrument(skip(state))]
async fn item_display(
    State(state): State<AppState>,
    Path(item_id): Path<ItemId>,
) -> Result<Json<ItemDisplay>, ApiError> {
    Ok(Json(state.catalog.lookup_display(item_id).await?))
}

/// Returns the router for catalog lookups.
pub fn router() -> Router<AppState> {
    Router::new().route("/{item_id}", get(item_display))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use castchain_catalog::CatalogGateway;
    use castchain_core::clock::SystemClock;
    use castchain_core::rng::DeterministicRng;
    use castchain_test_support::{EmptyEventRepository, MockRng, StaticCatalog, supporting_roster};
    use serde_json::Value;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        let catalog: Arc<dyn CatalogGateway> = Arc::new(
            StaticCatalog::new()
                .with_roster(21, supporting_roster(&[1]))
                .failing(22),
        );
        let rng: Arc<Mutex<dyn DeterministicRng>> = Arc::new(Mutex::new(MockRng));
        let state = AppState::new(
            Arc::new(SystemClock),
            rng,
            Arc::new(EmptyEventRepository),
            catalog,
        );
        router().with_state(state)
    }

    async fn get(uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_known_item_returns_display() {
        let (status, json) = get("/21").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["item_id"], 21);
        assert_eq!(json["title"], "Item 21");
    }

    #[tokio::test]
    async fn test_failing_lookup_returns_502() {
        let (status, json) = get("/22").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"], "upstream_error");
    }
}
