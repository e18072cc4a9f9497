//! Per-session game settings, fixed when the session is created.

use serde::{Deserialize, Serialize};

use super::power::PowerBudget;

/// A count that may be capped or unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "amount", rename_all = "snake_case")]
pub enum Limit {
    Unlimited,
    Limited(u32),
}

impl Limit {
    /// Whether something already used `used` times may be used again.
    #[must_use]
    pub const fn allows(self, used: u32) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Limited(max) => used < max,
        }
    }

    #[must_use]
    pub const fn is_unlimited(self) -> bool {
        matches!(self, Self::Unlimited)
    }
}

/// Number of seats at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// One player; the turn never changes hands.
    Solo,
    /// Host against guest.
    Versus,
}

/// Who owns the first turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartingSide {
    Host,
    Guest,
    Random,
}

/// What a reported turn timeout does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutPolicy {
    /// The turn owner is blocked; nothing else changes.
    BlockTurn,
    /// The turn passes to the opponent without spending a pass.
    ForcePass,
    /// The match ends.
    EndMatch,
}

/// What a participant disconnect does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisconnectPolicy {
    /// The remaining participant is told; the session continues.
    Notify,
    /// The session ends.
    EndSession,
}

/// Game settings chosen at session creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub mode: SessionMode,
    /// Max times one person may link items across the whole chain.
    pub link_limit: Limit,
    pub reveal_limit: Limit,
    pub pass_limit: Limit,
    pub extend_limit: Limit,
    /// Seconds per turn.
    pub time_limit: Limit,
    /// Seconds one extension adds to the running turn.
    pub extend_bonus_secs: u32,
    pub starting_side: StartingSide,
    pub timeout_policy: TimeoutPolicy,
    pub disconnect_policy: DisconnectPolicy,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            mode: SessionMode::Versus,
            link_limit: Limit::Limited(3),
            reveal_limit: Limit::Limited(1),
            pass_limit: Limit::Limited(1),
            extend_limit: Limit::Limited(1),
            time_limit: Limit::Limited(30),
            extend_bonus_secs: 15,
            starting_side: StartingSide::Host,
            timeout_policy: TimeoutPolicy::BlockTurn,
            disconnect_policy: DisconnectPolicy::EndSession,
        }
    }
}

impl SessionSettings {
    /// The budget each player starts with.
    #[must_use]
    pub const fn initial_budget(&self) -> PowerBudget {
        PowerBudget::new(self.reveal_limit, self.pass_limit, self.extend_limit)
    }
}
