//! Commands for the Session context.

use castchain_chain::ItemId;
use castchain_core::command::Command;
use uuid::Uuid;

use super::participants::PlayerToken;
use super::power::PowerKind;
use super::settings::SessionSettings;

/// Command to open a new session.
#[derive(Debug, Clone)]
pub struct CreateSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Settings fixed for the session's lifetime.
    pub settings: SessionSettings,
}

impl Command for CreateSession {
    fn command_type(&self) -> &'static str {
        "session.create_session"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to take a seat in a session.
#[derive(Debug, Clone)]
pub struct JoinSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    pub session_id: Uuid,
    pub player_token: PlayerToken,
}

impl Command for JoinSession {
    fn command_type(&self) -> &'static str {
        "session.join_session"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to start play from a first item. Host only.
#[derive(Debug, Clone)]
pub struct StartGame {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    pub session_id: Uuid,
    pub player_token: PlayerToken,
    pub starting_item_id: ItemId,
}

impl Command for StartGame {
    fn command_type(&self) -> &'static str {
        "session.start_game"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to place the next item in the chain.
#[derive(Debug, Clone)]
pub struct ProposeMove {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    pub session_id: Uuid,
    pub player_token: PlayerToken,
    pub item_id: ItemId,
}

impl Command for ProposeMove {
    fn command_type(&self) -> &'static str {
        "session.propose_move"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to spend one limited-use power.
#[derive(Debug, Clone)]
pub struct UsePower {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    pub session_id: Uuid,
    pub player_token: PlayerToken,
    pub kind: PowerKind,
}

impl Command for UsePower {
    fn command_type(&self) -> &'static str {
        "session.use_power"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command reporting that a participant's clock for `turn_number` ran out.
#[derive(Debug, Clone)]
pub struct ReportTimeout {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    pub session_id: Uuid,
    pub player_token: PlayerToken,
    /// Turn the reporter believes expired; stale reports are ignored.
    pub turn_number: u32,
}

impl Command for ReportTimeout {
    fn command_type(&self) -> &'static str {
        "session.report_timeout"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command reporting that a participant's connection dropped.
#[derive(Debug, Clone)]
pub struct ReportDisconnect {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    pub session_id: Uuid,
    pub player_token: PlayerToken,
}

impl Command for ReportDisconnect {
    fn command_type(&self) -> &'static str {
        "session.report_disconnect"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
