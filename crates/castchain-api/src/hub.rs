//! Per-session broadcast of committed events.
//!
//! Every participant of a session subscribes to the same channel. Commands
//! publish after their append returns, so concurrent commands may publish
//! out of sequence order; subscribers restore order from the log. Rejected
//! commands publish nothing.
//!
//! The hub also counts the open streams of each seated player, so a player
//! with a second socket open is not reported as gone when the first closes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use castchain_core::repository::StoredEvent;
use castchain_session::domain::participants::PlayerToken;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

/// Events buffered per subscriber before it is considered lagging.
const CHANNEL_CAPACITY: usize = 256;

/// Wire form of one committed session event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionMessage {
    pub session_id: Uuid,
    pub sequence_number: i64,
    pub event_type: String,
    pub occurred_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl From<&StoredEvent> for SessionMessage {
    fn from(event: &StoredEvent) -> Self {
        Self {
            session_id: event.aggregate_id,
            sequence_number: event.sequence_number,
            event_type: event.event_type.clone(),
            occurred_at: event.occurred_at,
            payload: event.payload.clone(),
        }
    }
}

type Presence = HashMap<(Uuid, PlayerToken), usize>;

/// Registry of broadcast channels keyed by session.
#[derive(Debug, Clone, Default)]
pub struct SessionHub {
    channels: Arc<Mutex<HashMap<Uuid, broadcast::Sender<SessionMessage>>>>,
    presence: Arc<Mutex<Presence>>,
}

impl SessionHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn channels(&self) -> MutexGuard<'_, HashMap<Uuid, broadcast::Sender<SessionMessage>>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn presence(&self) -> MutexGuard<'_, Presence> {
        self.presence.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribes to a session's events, opening its channel if needed.
    pub fn subscribe(&self, session_id: Uuid) -> broadcast::Receiver<SessionMessage> {
        self.channels()
            .entry(session_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Sends `events` to every current subscriber of the session. Returns
    /// the number of subscribers reached; zero when nobody is listening.
    pub fn publish(&self, session_id: Uuid, events: &[StoredEvent]) -> usize {
        let channels = self.channels();
        let Some(sender) = channels.get(&session_id) else {
            return 0;
        };

        let mut reached = 0;
        for event in events {
            reached = sender.send(SessionMessage::from(event)).unwrap_or(0);
        }
        debug!(%session_id, events = events.len(), subscribers = reached, "events published");
        reached
    }

    /// Closes a session's channel; subscribers see the stream end.
    pub fn remove(&self, session_id: Uuid) -> bool {
        self.presence().retain(|(id, _), _| *id != session_id);
        self.channels().remove(&session_id).is_some()
    }

    /// Counts a newly opened stream for `player`. Returns their open streams.
    pub fn attach(&self, session_id: Uuid, player: &PlayerToken) -> usize {
        let mut presence = self.presence();
        let open = presence.entry((session_id, player.clone())).or_insert(0);
        *open += 1;
        *open
    }

    /// Counts a closed stream for `player`. Returns the streams still open;
    /// zero means the player has no connection left.
    pub fn detach(&self, session_id: Uuid, player: &PlayerToken) -> usize {
        let mut presence = self.presence();
        let key = (session_id, player.clone());
        let Some(open) = presence.get_mut(&key) else {
            return 0;
        };
        *open = open.saturating_sub(1);
        let remaining = *open;
        if remaining == 0 {
            presence.remove(&key);
        }
        remaining
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tokio::sync::broadcast::error::RecvError;

    use super::*;

    fn stored(session_id: Uuid, sequence_number: i64) -> StoredEvent {
        StoredEvent {
            event_id: Uuid::new_v4(),
            aggregate_id: session_id,
            event_type: "session.item_placed".to_owned(),
            payload: serde_json::json!({ "ItemPlaced": { "turn_number": sequence_number } }),
            sequence_number,
            correlation_id: Uuid::new_v4(),
            causation_id: Uuid::new_v4(),
            occurred_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_every_subscriber_receives_events_in_order() {
        // Arrange
        let hub = SessionHub::new();
        let session_id = Uuid::new_v4();
        let mut host = hub.subscribe(session_id);
        let mut guest = hub.subscribe(session_id);

        // Act
        let reached = hub.publish(session_id, &[stored(session_id, 6), stored(session_id, 7)]);

        // Assert
        assert_eq!(reached, 2);
        for receiver in [&mut host, &mut guest] {
            assert_eq!(receiver.recv().await.unwrap().sequence_number, 6);
            assert_eq!(receiver.recv().await.unwrap().sequence_number, 7);
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_a_no_op() {
        let hub = SessionHub::new();
        let session_id = Uuid::new_v4();

        assert_eq!(hub.publish(session_id, &[stored(session_id, 1)]), 0);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        // Arrange
        let hub = SessionHub::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let mut listener = hub.subscribe(first);
        let _other = hub.subscribe(second);

        // Act
        hub.publish(second, &[stored(second, 1)]);
        hub.publish(first, &[stored(first, 4)]);

        // Assert
        let message = listener.recv().await.unwrap();
        assert_eq!(message.session_id, first);
        assert_eq!(message.sequence_number, 4);
    }

    #[tokio::test]
    async fn test_remove_closes_the_stream() {
        // Arrange
        let hub = SessionHub::new();
        let session_id = Uuid::new_v4();
        let mut receiver = hub.subscribe(session_id);

        // Act
        let removed = hub.remove(session_id);

        // Assert
        assert!(removed);
        assert!(!hub.remove(session_id));
        assert!(matches!(receiver.recv().await, Err(RecvError::Closed)));
    }

    #[test]
    fn test_player_is_gone_only_when_last_stream_closes() {
        // Arrange
        let hub = SessionHub::new();
        let session_id = Uuid::new_v4();
        let alice = PlayerToken::new("alice");
        let bob = PlayerToken::new("bob");

        // Act
        let first = hub.attach(session_id, &alice);
        let second = hub.attach(session_id, &alice);
        hub.attach(session_id, &bob);

        // Assert
        assert_eq!((first, second), (1, 2));
        assert_eq!(hub.detach(session_id, &alice), 1);
        assert_eq!(hub.detach(session_id, &alice), 0);
        assert_eq!(hub.detach(session_id, &alice), 0);
        assert_eq!(hub.detach(session_id, &bob), 0);
    }

    #[test]
    fn test_remove_forgets_presence() {
        let hub = SessionHub::new();
        let session_id = Uuid::new_v4();
        let alice = PlayerToken::new("alice");
        hub.attach(session_id, &alice);

        hub.remove(session_id);

        assert_eq!(hub.attach(session_id, &alice), 1);
    }

    #[test]
    fn test_message_uses_session_vocabulary() {
        let session_id = Uuid::new_v4();

        let json = serde_json::to_value(SessionMessage::from(&stored(session_id, 3))).unwrap();

        assert_eq!(json["session_id"], session_id.to_string());
        assert_eq!(json["event_type"], "session.item_placed");
        assert_eq!(json["payload"]["ItemPlaced"]["turn_number"], 3);
    }
}
