//! Domain events for the Session context.
//!
//! These are also the wire vocabulary: `GameStarted` is a full snapshot,
//! every later event is a delta carrying whatever was derived when it was
//! decided (link-sets, budgets after spending) so that folding never has to
//! recompute anything.

use castchain_chain::{CastMember, Item, ItemId, Link};
use castchain_core::event::{DomainEvent, EventMetadata};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::participants::{PlayerRole, PlayerToken};
use super::power::{PowerBudget, PowerBudgets};
use super::settings::SessionSettings;

/// Emitted when a session is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
    pub settings: SessionSettings,
}

/// Emitted when a new token takes a seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerJoined {
    pub session_id: Uuid,
    pub player_token: PlayerToken,
    pub role: PlayerRole,
}

/// Emitted when the second seat fills; both tokens are announced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPaired {
    pub session_id: Uuid,
    pub host: PlayerToken,
    pub guest: PlayerToken,
}

/// Emitted when the host starts play. Full snapshot of the new game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStarted {
    pub session_id: Uuid,
    pub settings: SessionSettings,
    pub host: PlayerToken,
    pub guest: Option<PlayerToken>,
    pub starting_item: Item,
    pub roster: Vec<CastMember>,
    pub turn_owner: PlayerRole,
    pub budgets: PowerBudgets,
    /// Start of the first turn.
    pub epoch: DateTime<Utc>,
}

/// Emitted when a move is accepted (the `nextItem` event).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPlaced {
    pub session_id: Uuid,
    pub placed_by: PlayerRole,
    pub item: Item,
    pub roster: Vec<CastMember>,
    /// Link-set between the previous item and this one.
    pub links: Vec<Link>,
    pub turn_owner: PlayerRole,
    pub turn_number: u32,
    pub epoch: DateTime<Utc>,
}

/// Emitted when a turn is handed over without a move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnPassed {
    pub session_id: Uuid,
    pub passed_by: PlayerRole,
    /// Imposed by the timeout policy rather than spent from the budget.
    pub forced: bool,
    pub budget: PowerBudget,
    pub turn_owner: PlayerRole,
    pub turn_number: u32,
    pub epoch: DateTime<Utc>,
}

/// Emitted when the running turn is extended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeExtended {
    pub session_id: Uuid,
    pub extended_by: PlayerRole,
    pub bonus_secs: u32,
    /// Bonus accumulated on this turn, this extension included.
    pub total_bonus_secs: u32,
    pub budget: PowerBudget,
    /// Epoch of the turn being extended (unchanged).
    pub epoch: DateTime<Utc>,
}

/// Emitted when a player spends a reveal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastRevealed {
    pub session_id: Uuid,
    pub revealed_by: PlayerRole,
    pub item_id: ItemId,
    pub budget: PowerBudget,
}

/// Emitted when a turn's timeout is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnTimedOut {
    pub session_id: Uuid,
    pub player: PlayerRole,
    pub turn_number: u32,
}

/// Emitted when a participant drops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDisconnected {
    pub session_id: Uuid,
    pub player: PlayerRole,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum EndReason {
    TimedOut { player: PlayerRole },
    PlayerDisconnected { player: PlayerRole },
}

/// Emitted when a session is over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEnded {
    pub session_id: Uuid,
    pub reason: EndReason,
}

/// Event type identifier for [`SessionCreated`].
pub const SESSION_CREATED_EVENT_TYPE: &str = "session.session_created";
/// Event type identifier for [`PlayerJoined`].
pub const PLAYER_JOINED_EVENT_TYPE: &str = "session.player_joined";
/// Event type identifier for [`SessionPaired`].
pub const SESSION_PAIRED_EVENT_TYPE: &str = "session.session_paired";
/// Event type identifier for [`GameStarted`].
pub const GAME_STARTED_EVENT_TYPE: &str = "session.game_started";
/// Event type identifier for [`ItemPlaced`].
pub const ITEM_PLACED_EVENT_TYPE: &str = "session.item_placed";
/// Event type identifier for [`TurnPassed`].
pub const TURN_PASSED_EVENT_TYPE: &str = "session.turn_passed";
/// Event type identifier for [`TimeExtended`].
pub const TIME_EXTENDED_EVENT_TYPE: &str = "session.time_extended";
/// Event type identifier for [`CastRevealed`].
pub const CAST_REVEALED_EVENT_TYPE: &str = "session.cast_revealed";
/// Event type identifier for [`TurnTimedOut`].
pub const TURN_TIMED_OUT_EVENT_TYPE: &str = "session.turn_timed_out";
/// Event type identifier for [`PlayerDisconnected`].
pub const PLAYER_DISCONNECTED_EVENT_TYPE: &str = "session.player_disconnected";
/// Event type identifier for [`SessionEnded`].
pub const SESSION_ENDED_EVENT_TYPE: &str = "session.session_ended";

/// Event payload variants for the Session context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEventKind {
    SessionCreated(SessionCreated),
    PlayerJoined(PlayerJoined),
    SessionPaired(SessionPaired),
    GameStarted(Box<GameStarted>),
    ItemPlaced(ItemPlaced),
    TurnPassed(TurnPassed),
    TimeExtended(TimeExtended),
    CastRevealed(CastRevealed),
    TurnTimedOut(TurnTimedOut),
    PlayerDisconnected(PlayerDisconnected),
    SessionEnded(SessionEnded),
}

impl SessionEventKind {
    /// The dotted type name of this payload.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::SessionCreated(_) => SESSION_CREATED_EVENT_TYPE,
            Self::PlayerJoined(_) => PLAYER_JOINED_EVENT_TYPE,
            Self::SessionPaired(_) => SESSION_PAIRED_EVENT_TYPE,
            Self::GameStarted(_) => GAME_STARTED_EVENT_TYPE,
            Self::ItemPlaced(_) => ITEM_PLACED_EVENT_TYPE,
            Self::TurnPassed(_) => TURN_PASSED_EVENT_TYPE,
            Self::TimeExtended(_) => TIME_EXTENDED_EVENT_TYPE,
            Self::CastRevealed(_) => CAST_REVEALED_EVENT_TYPE,
            Self::TurnTimedOut(_) => TURN_TIMED_OUT_EVENT_TYPE,
            Self::PlayerDisconnected(_) => PLAYER_DISCONNECTED_EVENT_TYPE,
            Self::SessionEnded(_) => SESSION_ENDED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the Session context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: SessionEventKind,
}

impl DomainEvent for SessionEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Every payload field is a plain serde type; this cannot fail.
        serde_json::to_value(&self.kind).unwrap_or(serde_json::Value::Null)
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
