//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use castchain_catalog::CatalogGateway;
use castchain_core::clock::Clock;
use castchain_core::repository::{EventRepository, StoredEvent};
use castchain_core::rng::DeterministicRng;
use castchain_session::domain::events::SESSION_ENDED_EVENT_TYPE;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::hub::SessionHub;

/// How long an ended session stays readable before it is released.
pub const DEFAULT_ENDED_SESSION_TTL: Duration = Duration::from_secs(300);

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock used for turn epochs and deadlines.
    pub clock: Arc<dyn Clock>,
    /// Source for the random opening side.
    pub rng: Arc<Mutex<dyn DeterministicRng>>,
    /// Per-session event logs.
    pub event_repository: Arc<dyn EventRepository>,
    /// Roster and display lookups.
    pub catalog: Arc<dyn CatalogGateway>,
    /// Live event fan-out to connected participants.
    pub hub: SessionHub,
    /// Delay between a session ending and its log and channel being dropped.
    pub ended_session_ttl: Duration,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        rng: Arc<Mutex<dyn DeterministicRng>>,
        event_repository: Arc<dyn EventRepository>,
        catalog: Arc<dyn CatalogGateway>,
    ) -> Self {
        Self {
            clock,
            rng,
            event_repository,
            catalog,
            hub: SessionHub::new(),
            ended_session_ttl: DEFAULT_ENDED_SESSION_TTL,
        }
    }

    #[must_use]
    pub const fn with_ended_session_ttl(mut self, ttl: Duration) -> Self {
        self.ended_session_ttl = ttl;
        self
    }

    /// Publishes freshly appended events. When they end the session, its
    /// log and channel are released once `ended_session_ttl` has passed.
    pub fn commit(&self, session_id: Uuid, events: &[StoredEvent]) {
        self.hub.publish(session_id, events);

        if events
            .iter()
            .any(|e| e.event_type == SESSION_ENDED_EVENT_TYPE)
        {
            self.schedule_eviction(session_id);
        }
    }

    fn schedule_eviction(&self, session_id: Uuid) {
        let repo = Arc::clone(&self.event_repository);
        let hub = self.hub.clone();
        let ttl = self.ended_session_ttl;

        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            match repo.evict(session_id).await {
                Ok(evicted) => info!(%session_id, evicted, "ended session released"),
                Err(err) => warn!(%session_id, error = %err, "ended session not released"),
            }
            hub.remove(session_id);
        });
    }
}

#[cfg(test)]
mod tests {
    use castchain_event_store::InMemoryEventRepository;
    use castchain_test_support::{FixedClock, MockRng, StaticCatalog};
    use chrono::{TimeZone, Utc};

    use super::*;

    fn state(repo: Arc<dyn EventRepository>) -> AppState {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        ));
        let rng: Arc<Mutex<dyn DeterministicRng>> = Arc::new(Mutex::new(MockRng));
        let catalog: Arc<dyn CatalogGateway> = Arc::new(StaticCatalog::new());
        AppState::new(clock, rng, repo, catalog).with_ended_session_ttl(Duration::from_millis(20))
    }

    fn stored(session_id: Uuid, sequence_number: i64, event_type: &str) -> StoredEvent {
        StoredEvent {
            event_id: Uuid::new_v4(),
            aggregate_id: session_id,
            event_type: event_type.to_owned(),
            payload: serde_json::json!({}),
            sequence_number,
            correlation_id: Uuid::new_v4(),
            causation_id: Uuid::new_v4(),
            occurred_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_ended_session_is_released_after_ttl() {
        // Arrange
        let repo = Arc::new(InMemoryEventRepository::new());
        let state = state(repo.clone());
        let session_id = Uuid::new_v4();
        let events = vec![
            stored(session_id, 1, "session.player_disconnected"),
            stored(session_id, 2, SESSION_ENDED_EVENT_TYPE),
        ];
        repo.append_events(session_id, 0, &events).await.unwrap();
        let mut receiver = state.hub.subscribe(session_id);

        // Act
        state.commit(session_id, &events);

        // Assert
        assert_eq!(receiver.recv().await.unwrap().sequence_number, 1);
        assert_eq!(receiver.recv().await.unwrap().sequence_number, 2);
        assert_eq!(repo.load_events(session_id).await.unwrap().len(), 2);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(repo.load_events(session_id).await.unwrap().is_empty());
        assert!(!state.hub.remove(session_id));
    }

    #[tokio::test]
    async fn test_running_session_is_kept() {
        // Arrange
        let repo = Arc::new(InMemoryEventRepository::new());
        let state = state(repo.clone());
        let session_id = Uuid::new_v4();
        let events = vec![stored(session_id, 1, "session.item_placed")];
        repo.append_events(session_id, 0, &events).await.unwrap();
        let _receiver = state.hub.subscribe(session_id);

        // Act
        state.commit(session_id, &events);
        tokio::time::sleep(Duration::from_millis(100)).await;

        // Assert
        assert_eq!(repo.load_events(session_id).await.unwrap().len(), 1);
        assert!(state.hub.remove(session_id));
    }
}
