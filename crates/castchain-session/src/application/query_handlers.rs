//! Query handlers for the Session context.
//!
//! This module contains query handlers that reconstitute aggregates
//! from stored events and return read-only view DTOs.

use castchain_chain::{ChainEntry, ChainStats, Link};
use castchain_core::aggregate::AggregateRoot;
use castchain_core::clock::Clock;
use castchain_core::repository::EventRepository;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::application::command_handlers;
use crate::domain::aggregates::{GameSession, SessionPhase};
use crate::domain::events::EndReason;
use crate::domain::participants::{PlayerRole, PlayerToken};
use crate::domain::power::PowerBudgets;
use crate::domain::settings::SessionSettings;
use crate::error::SessionError;

/// One link as shown in the chain, with the person's usage at that point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkView {
    #[serde(flatten)]
    pub link: Link,
    /// Link-sets containing this person up to and including this one.
    pub times_used: u32,
    /// Whether `times_used` has reached the link limit.
    pub at_limit: bool,
}

/// Read-only view of a game session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    /// Sequence number of the last event folded into this view.
    pub version: i64,
    pub phase: SessionPhase,
    pub settings: SessionSettings,
    pub host: Option<PlayerToken>,
    pub guest: Option<PlayerToken>,
    /// `None` until play starts.
    pub turn_owner: Option<PlayerRole>,
    pub turn_number: u32,
    /// Set once the running turn's timeout has been confirmed.
    pub turn_blocked: bool,
    pub turn_epoch: Option<DateTime<Utc>>,
    pub bonus_secs: u32,
    /// Whole seconds left; `None` for an unlimited clock or outside play.
    pub remaining_time_secs: Option<i64>,
    /// Placed items with their rosters, oldest first.
    pub chain: Vec<ChainEntry>,
    /// `link_sets[i]` links `chain[i]` to `chain[i + 1]`.
    pub link_sets: Vec<Vec<LinkView>>,
    pub frontier: Vec<Link>,
    pub budgets: PowerBudgets,
    pub stats: ChainStats,
    pub disconnected: Vec<PlayerRole>,
    pub end_reason: Option<EndReason>,
}

impl SessionView {
    /// Builds the view of `session` as of `now`.
    #[must_use]
    pub fn of(session: &GameSession, now: DateTime<Utc>) -> Self {
        let chain = session.chain();
        let limit = session.settings().link_limit;

        let link_sets = chain
            .link_sets()
            .iter()
            .enumerate()
            .map(|(index, set)| {
                set.iter()
                    .map(|link| {
                        let times_used = chain.usage_through(index, link.person_id);
                        LinkView {
                            link: link.clone(),
                            times_used,
                            at_limit: !limit.allows(times_used),
                        }
                    })
                    .collect()
            })
            .collect();

        let active = session.phase() == SessionPhase::Active;
        let timer = session.timer().filter(|_| active);

        Self {
            session_id: session.id,
            version: session.version(),
            phase: session.phase(),
            settings: session.settings().clone(),
            host: session.host().cloned(),
            guest: session.guest().cloned(),
            turn_owner: (session.turn_number() > 0).then(|| session.turn_owner()),
            turn_number: session.turn_number(),
            turn_blocked: session.is_blocked(),
            turn_epoch: timer.map(|t| t.epoch()),
            bonus_secs: timer.map_or(0, |t| t.bonus_secs()),
            remaining_time_secs: session.remaining_time(now).map(|d| d.num_seconds()),
            chain: chain.entries().to_vec(),
            link_sets,
            frontier: session.current_frontier().to_vec(),
            budgets: *session.budgets(),
            stats: chain.stats(),
            disconnected: session.disconnected().to_vec(),
            end_reason: session.end_reason(),
        }
    }
}

/// Retrieves a session view by its aggregate ID.
///
/// # Errors
///
/// Returns `CoordinationError::SessionNotFound` if no events exist for the
/// ID, and `SessionError::Domain` if event deserialization fails.
pub async fn get_session_by_id(
    session_id: Uuid,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<SessionView, SessionError> {
    let session = command_handlers::load(session_id, repo).await?;
    Ok(SessionView::of(&session, clock.now()))
}
