//! Command handlers for the Session context.
//!
//! This module contains application-level command handler functions that
//! orchestrate domain logic: load aggregate, execute command, persist events.
//! Catalog lookups happen before the aggregate is loaded for the final
//! decision, so no session state is held while waiting on the network.

use castchain_catalog::CatalogGateway;
use castchain_chain::{Item, Link};
use castchain_core::aggregate::AggregateRoot;
use castchain_core::clock::Clock;
use castchain_core::command::Command;
use castchain_core::error::DomainError;
use castchain_core::event::{DomainEvent, EventMetadata};
use castchain_core::repository::{EventRepository, StoredEvent};
use castchain_core::rng::DeterministicRng;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::aggregates::{GameSession, JoinOutcome, PowerOutcome};
use crate::domain::commands::{
    CreateSession, JoinSession, ProposeMove, ReportDisconnect, ReportTimeout, StartGame, UsePower,
};
use crate::domain::events::{SessionEvent, SessionEventKind};
use crate::error::{CoordinationError, SessionError};

/// Appends that lose a race are re-decided against the fresh stream this
/// many times in total before the conflict is surfaced.
pub const MAX_APPEND_ATTEMPTS: u32 = 3;

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct SessionCommandResult<T = ()> {
    /// The session affected or created by the command.
    pub aggregate_id: Uuid,
    /// The stored events produced and persisted. Empty when the command
    /// changed nothing (e.g. an idempotent rejoin).
    pub stored_events: Vec<StoredEvent>,
    /// Command-specific answer for the caller.
    pub outcome: T,
}

/// Reconstitutes a `GameSession` from stored events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub fn reconstitute(
    session_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<GameSession, DomainError> {
    let mut session = GameSession::new(session_id);
    for stored in existing_events {
        let kind: SessionEventKind =
            serde_json::from_value(stored.payload.clone()).map_err(|e| {
                DomainError::Infrastructure(format!("event deserialization failed: {e}"))
            })?;
        let event = SessionEvent {
            metadata: EventMetadata::from_stored(stored),
            kind,
        };
        session.apply(&event);
    }
    Ok(session)
}

/// Loads and reconstitutes a session.
///
/// # Errors
///
/// Returns `CoordinationError::SessionNotFound` if no events exist.
pub(crate) async fn load(
    session_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<GameSession, SessionError> {
    let existing_events = repo.load_events(session_id).await?;
    if existing_events.is_empty() {
        return Err(CoordinationError::SessionNotFound(session_id).into());
    }
    Ok(reconstitute(session_id, &existing_events)?)
}

/// Runs `decide` against the latest state and appends what it produced.
///
/// A concurrency conflict means another command committed first; the
/// session is reloaded and `decide` runs again, so a proposal that lost the
/// race is judged against the turn as it now stands.
async fn execute<T, F>(
    session_id: Uuid,
    repo: &dyn EventRepository,
    mut decide: F,
) -> Result<SessionCommandResult<T>, SessionError>
where
    F: FnMut(&mut GameSession) -> Result<T, SessionError> + Send,
{
    let mut attempt = 1;
    loop {
        let mut session = load(session_id, repo).await?;
        let outcome = decide(&mut session)?;

        let stored_events: Vec<StoredEvent> = session
            .uncommitted_events()
            .iter()
            .map(DomainEvent::to_stored)
            .collect();
        if stored_events.is_empty() {
            return Ok(SessionCommandResult {
                aggregate_id: session_id,
                stored_events,
                outcome,
            });
        }

        match repo
            .append_events(session_id, session.version(), &stored_events)
            .await
        {
            Ok(()) => {
                session.clear_uncommitted_events();
                return Ok(SessionCommandResult {
                    aggregate_id: session_id,
                    stored_events,
                    outcome,
                });
            }
            Err(DomainError::ConcurrencyConflict {
                expected, actual, ..
            }) if attempt < MAX_APPEND_ATTEMPTS => {
                warn!(%session_id, attempt, expected, actual, "append lost a race, re-deciding");
                attempt += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// Handles the `CreateSession` command: creates a new aggregate with the
/// given settings and persists the resulting event.
///
/// # Errors
///
/// Returns `SessionError::Domain` if event appending fails.
pub async fn handle_create_session(
    command: &CreateSession,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<SessionCommandResult, SessionError> {
    let session_id = Uuid::new_v4();
    info!(
        %session_id,
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
        mode = ?command.settings.mode,
        "handling command"
    );

    let mut session = GameSession::new(session_id);
    session.create(command.settings.clone(), command.correlation_id, clock);

    let stored_events: Vec<StoredEvent> = session
        .uncommitted_events()
        .iter()
        .map(DomainEvent::to_stored)
        .collect();

    repo.append_events(session_id, session.version(), &stored_events)
        .await?;

    Ok(SessionCommandResult {
        aggregate_id: session_id,
        stored_events,
        outcome: (),
    })
}

/// Handles the `JoinSession` command.
///
/// # Errors
///
/// Returns `CoordinationError` if the session is missing or full.
pub async fn handle_join_session(
    command: &JoinSession,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<SessionCommandResult<JoinOutcome>, SessionError> {
    info!(
        session_id = %command.session_id,
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
        "handling command"
    );

    execute(command.session_id, repo, |session| {
        session.join(command.player_token.clone(), command.correlation_id, clock)
    })
    .await
}

/// Handles the `StartGame` command: validates the starter, resolves the
/// starting item's roster through the catalog, then starts play.
///
/// # Errors
///
/// Returns `SessionError::Validation` if the game cannot start, and
/// `SessionError::Upstream` if the roster lookup fails.
pub async fn handle_start_game(
    command: &StartGame,
    clock: &dyn Clock,
    rng: &mut dyn DeterministicRng,
    repo: &dyn EventRepository,
    catalog: &dyn CatalogGateway,
) -> Result<SessionCommandResult, SessionError> {
    info!(
        session_id = %command.session_id,
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
        item_id = command.starting_item_id,
        "handling command"
    );

    load(command.session_id, repo)
        .await?
        .ensure_can_start(&command.player_token)?;

    let roster = catalog.lookup_roster(command.starting_item_id).await?;
    let item = Item::new(command.starting_item_id);

    execute(command.session_id, repo, |session| {
        session.start(
            &command.player_token,
            item,
            roster.clone(),
            command.correlation_id,
            clock,
            &mut *rng,
        )
    })
    .await
}

/// Handles the `ProposeMove` command.
///
/// Turn, expiry and duplicate checks run before the catalog is consulted;
/// the full rule check runs again against the latest state when the move
/// is decided.
///
/// # Errors
///
/// Returns `SessionError::Validation` for a rejected move (reported only to
/// the proposer) and `SessionError::Upstream` if the roster lookup fails.
pub async fn handle_propose_move(
    command: &ProposeMove,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
    catalog: &dyn CatalogGateway,
) -> Result<SessionCommandResult<Vec<Link>>, SessionError> {
    info!(
        session_id = %command.session_id,
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
        item_id = command.item_id,
        "handling command"
    );

    let precheck = load(command.session_id, repo).await?.precheck_move(
        &command.player_token,
        command.item_id,
        clock.now(),
    );
    if let Err(err) = precheck {
        warn!(session_id = %command.session_id, error = %err, "move rejected");
        return Err(err.into());
    }

    let roster = catalog.lookup_roster(command.item_id).await?;
    let item = Item::new(command.item_id);

    let result = execute(command.session_id, repo, |session| {
        session.propose_move(
            &command.player_token,
            item,
            roster.clone(),
            command.correlation_id,
            clock,
        )
    })
    .await;

    match &result {
        Ok(accepted) => {
            debug!(
                session_id = %command.session_id,
                links = accepted.outcome.len(),
                "move accepted"
            );
        }
        Err(SessionError::Validation(err)) => {
            warn!(session_id = %command.session_id, error = %err, "move rejected");
        }
        Err(_) => {}
    }
    result
}

/// Handles the `UsePower` command.
///
/// # Errors
///
/// Returns `SessionError::Validation` if the power cannot be used now.
pub async fn handle_use_power(
    command: &UsePower,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<SessionCommandResult<PowerOutcome>, SessionError> {
    info!(
        session_id = %command.session_id,
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
        kind = %command.kind,
        "handling command"
    );

    execute(command.session_id, repo, |session| {
        session.use_power(
            &command.player_token,
            command.kind,
            command.correlation_id,
            clock,
        )
    })
    .await
}

/// Handles the `ReportTimeout` command.
///
/// # Errors
///
/// Returns `SessionError::Validation` if the turn has not run out.
pub async fn handle_report_timeout(
    command: &ReportTimeout,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<SessionCommandResult, SessionError> {
    info!(
        session_id = %command.session_id,
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
        turn_number = command.turn_number,
        "handling command"
    );

    execute(command.session_id, repo, |session| {
        session.report_timeout(
            &command.player_token,
            command.turn_number,
            command.correlation_id,
            clock,
        )
    })
    .await
}

/// Handles the `ReportDisconnect` command.
///
/// # Errors
///
/// Returns `SessionError::Validation` for a token that holds no seat.
pub async fn handle_report_disconnect(
    command: &ReportDisconnect,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<SessionCommandResult, SessionError> {
    info!(
        session_id = %command.session_id,
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
        "handling command"
    );

    execute(command.session_id, repo, |session| {
        session.disconnect(&command.player_token, command.correlation_id, clock)
    })
    .await
}

/// Drops a session's event log.
///
/// # Errors
///
/// Returns `CoordinationError::SessionNotFound` if there was nothing to drop.
pub async fn handle_evict_session(
    session_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<(), SessionError> {
    if repo.evict(session_id).await? {
        info!(%session_id, "session evicted");
        Ok(())
    } else {
        Err(CoordinationError::SessionNotFound(session_id).into())
    }
}
