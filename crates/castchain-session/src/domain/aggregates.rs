//! Aggregate roots for the Session context.

use castchain_chain::{CastMember, ChainState, Item, ItemId, Link, PersonId};
use castchain_core::aggregate::AggregateRoot;
use castchain_core::clock::Clock;
use castchain_core::event::EventMetadata;
use castchain_core::rng::DeterministicRng;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use super::events::{
    CastRevealed, EndReason, GameStarted, ItemPlaced, PlayerDisconnected, PlayerJoined,
    SessionCreated, SessionEnded, SessionEvent, SessionEventKind, SessionPaired, TimeExtended,
    TurnPassed, TurnTimedOut,
};
use super::participants::{PlayerRole, PlayerToken};
use super::power::{PowerBudget, PowerBudgets, PowerKind};
use super::settings::{
    DisconnectPolicy, Limit, SessionMode, SessionSettings, StartingSide, TimeoutPolicy,
};
use super::timer::RoundTimer;
use crate::error::{CoordinationError, ExhaustedPerson, SessionError, ValidationError};

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Waiting for players.
    Lobby,
    /// Both seats are filled; the host has not started yet.
    Paired,
    /// In play.
    Active,
    Over,
}

/// Result of a join attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub role: PlayerRole,
    /// The other player's token, once there is one.
    pub opponent: Option<PlayerToken>,
}

/// Result of spending a power.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PowerOutcome {
    /// Cast of the most recently placed item.
    Revealed(Vec<CastMember>),
    Passed,
    Extended { total_bonus_secs: u32 },
}

/// The aggregate root for one game session: seating, turns, chain and powers.
#[derive(Debug)]
pub struct GameSession {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Sequence number of the last applied event.
    pub(crate) version: i64,
    phase: SessionPhase,
    settings: SessionSettings,
    host: Option<PlayerToken>,
    guest: Option<PlayerToken>,
    chain: ChainState,
    turn_owner: PlayerRole,
    turn_number: u32,
    timer: Option<RoundTimer>,
    budgets: PowerBudgets,
    /// Turn whose timeout was confirmed, if any.
    timed_out_turn: Option<u32>,
    disconnected: Vec<PlayerRole>,
    end_reason: Option<EndReason>,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<SessionEvent>,
}

impl GameSession {
    /// Creates an empty session shell; state arrives through events.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        let settings = SessionSettings::default();
        let budgets = PowerBudgets::uniform(settings.initial_budget());
        Self {
            id,
            version: 0,
            phase: SessionPhase::Lobby,
            settings,
            host: None,
            guest: None,
            chain: ChainState::new(),
            turn_owner: PlayerRole::Host,
            turn_number: 0,
            timer: None,
            budgets,
            timed_out_turn: None,
            disconnected: Vec::new(),
            end_reason: None,
            uncommitted_events: Vec::new(),
        }
    }

    /// Returns the next sequence number for a new event.
    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version + self.uncommitted_events.len() as i64 + 1
    }

    /// Folds a decided event into the state and queues it for persistence.
    fn record(&mut self, kind: SessionEventKind, correlation_id: Uuid, now: DateTime<Utc>) {
        // TODO: event_id uses Uuid::new_v4(); thread an id source through
        // the decision methods to make replays byte-identical.
        let event = SessionEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                aggregate_id: self.id,
                sequence_number: self.next_sequence_number(),
                correlation_id,
                causation_id: correlation_id,
                occurred_at: now,
            },
            kind,
        };

        self.fold(&event.kind);
        self.uncommitted_events.push(event);
    }

    /// Opens the session with its settings, producing `SessionCreated`.
    pub fn create(&mut self, settings: SessionSettings, correlation_id: Uuid, clock: &dyn Clock) {
        let kind = SessionEventKind::SessionCreated(SessionCreated {
            session_id: self.id,
            settings,
        });
        self.record(kind, correlation_id, clock.now());
    }

    /// Seats a player. The first distinct token hosts, the second is the
    /// guest and pairs the session. Rejoining with a seated token changes
    /// nothing and returns the same role.
    ///
    /// # Errors
    ///
    /// Returns `CoordinationError::SessionFull` when both seats are taken
    /// (or the one seat, in solo mode), and `SessionNotActive` once over.
    pub fn join(
        &mut self,
        token: PlayerToken,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<JoinOutcome, SessionError> {
        if let Some(role) = self.role_of(&token) {
            return Ok(JoinOutcome {
                role,
                opponent: self.seat(role.opponent()).cloned(),
            });
        }
        if self.phase == SessionPhase::Over {
            return Err(ValidationError::SessionNotActive.into());
        }

        let now = clock.now();
        let Some(host) = self.host.clone() else {
            self.record(
                SessionEventKind::PlayerJoined(PlayerJoined {
                    session_id: self.id,
                    player_token: token,
                    role: PlayerRole::Host,
                }),
                correlation_id,
                now,
            );
            return Ok(JoinOutcome {
                role: PlayerRole::Host,
                opponent: None,
            });
        };

        let seat_open = self.settings.mode == SessionMode::Versus
            && self.phase == SessionPhase::Lobby
            && self.guest.is_none();
        if !seat_open {
            return Err(CoordinationError::SessionFull.into());
        }

        self.record(
            SessionEventKind::PlayerJoined(PlayerJoined {
                session_id: self.id,
                player_token: token.clone(),
                role: PlayerRole::Guest,
            }),
            correlation_id,
            now,
        );
        self.record(
            SessionEventKind::SessionPaired(SessionPaired {
                session_id: self.id,
                host: host.clone(),
                guest: token,
            }),
            correlation_id,
            now,
        );

        Ok(JoinOutcome {
            role: PlayerRole::Guest,
            opponent: Some(host),
        })
    }

    /// Checks that `token` may start the game now, before any catalog work.
    ///
    /// # Errors
    ///
    /// Returns `NotParticipant`, `NotHost`, `OpponentMissing`,
    /// `AlreadyStarted` or `SessionNotActive`.
    pub fn ensure_can_start(&self, token: &PlayerToken) -> Result<(), ValidationError> {
        let role = self.role_of(token).ok_or(ValidationError::NotParticipant)?;
        if role != PlayerRole::Host {
            return Err(ValidationError::NotHost);
        }
        match self.phase {
            SessionPhase::Paired => Ok(()),
            SessionPhase::Lobby if self.settings.mode == SessionMode::Solo => Ok(()),
            SessionPhase::Lobby => Err(ValidationError::OpponentMissing),
            SessionPhase::Active => Err(ValidationError::AlreadyStarted),
            SessionPhase::Over => Err(ValidationError::SessionNotActive),
        }
    }

    /// Starts play from `starting_item`, producing the `GameStarted` snapshot.
    ///
    /// # Errors
    ///
    /// See [`GameSession::ensure_can_start`].
    pub fn start(
        &mut self,
        token: &PlayerToken,
        starting_item: Item,
        roster: Vec<CastMember>,
        correlation_id: Uuid,
        clock: &dyn Clock,
        rng: &mut dyn DeterministicRng,
    ) -> Result<(), SessionError> {
        self.ensure_can_start(token)?;

        let turn_owner = match (self.settings.mode, self.settings.starting_side) {
            (SessionMode::Solo, _) | (SessionMode::Versus, StartingSide::Host) => PlayerRole::Host,
            (SessionMode::Versus, StartingSide::Guest) => PlayerRole::Guest,
            (SessionMode::Versus, StartingSide::Random) => {
                if rng.next_u32_range(0, 1) == 0 {
                    PlayerRole::Host
                } else {
                    PlayerRole::Guest
                }
            }
        };

        let Some(host) = self.host.clone() else {
            return Err(ValidationError::NotParticipant.into());
        };

        let started = GameStarted {
            session_id: self.id,
            settings: self.settings.clone(),
            host,
            guest: self.guest.clone(),
            starting_item,
            roster,
            turn_owner,
            budgets: PowerBudgets::uniform(self.settings.initial_budget()),
            epoch: clock.now(),
        };
        self.record(
            SessionEventKind::GameStarted(Box::new(started)),
            correlation_id,
            clock.now(),
        );
        Ok(())
    }

    /// Checks everything about a move that does not need the candidate's
    /// roster. Returns the mover's role.
    ///
    /// # Errors
    ///
    /// Returns `SessionNotActive`, `NotParticipant`, `NotYourTurn`,
    /// `TurnExpired` or `DuplicateItem`.
    pub fn precheck_move(
        &self,
        token: &PlayerToken,
        item_id: ItemId,
        now: DateTime<Utc>,
    ) -> Result<PlayerRole, ValidationError> {
        if self.phase != SessionPhase::Active {
            return Err(ValidationError::SessionNotActive);
        }
        let role = self.role_of(token).ok_or(ValidationError::NotParticipant)?;
        if role != self.turn_owner {
            return Err(ValidationError::NotYourTurn);
        }
        if self.turn_is_over(now) {
            return Err(ValidationError::TurnExpired);
        }
        if self.chain.contains(item_id) {
            return Err(ValidationError::DuplicateItem(item_id));
        }
        Ok(role)
    }

    /// Places `item` as the next link of the chain.
    ///
    /// The candidate must share at least one person with the most recently
    /// placed item, and at least one of those persons must still be under
    /// the link limit. The whole shared set becomes the new link-set.
    ///
    /// # Errors
    ///
    /// Everything from [`GameSession::precheck_move`], plus `NoSharedCast`
    /// and `AllLinksExhausted` naming every shared person.
    pub fn propose_move(
        &mut self,
        token: &PlayerToken,
        item: Item,
        roster: Vec<CastMember>,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<Vec<Link>, SessionError> {
        let now = clock.now();
        let role = self.precheck_move(token, item.id, now)?;

        let links = self.chain.candidate_links(&roster);
        if links.is_empty() {
            return Err(ValidationError::NoSharedCast.into());
        }

        let limit = self.settings.link_limit;
        if !links
            .iter()
            .any(|link| limit.allows(self.chain.usage_count(link.person_id)))
        {
            let exhausted = links
                .iter()
                .map(|link| ExhaustedPerson {
                    person_id: link.person_id,
                    display_name: link.display_name.clone(),
                    times_used: self.chain.usage_count(link.person_id),
                })
                .collect();
            return Err(ValidationError::AllLinksExhausted(exhausted).into());
        }

        let placed = ItemPlaced {
            session_id: self.id,
            placed_by: role,
            item,
            roster,
            links: links.clone(),
            turn_owner: self.next_turn_owner(),
            turn_number: self.turn_number + 1,
            epoch: now,
        };
        self.record(SessionEventKind::ItemPlaced(placed), correlation_id, now);
        Ok(links)
    }

    /// Spends one use of a power.
    ///
    /// Reveal may be used at any time in play and returns the latest item's
    /// cast. Pass and extend are turn-owner only.
    ///
    /// # Errors
    ///
    /// Returns `SessionNotActive`, `NotParticipant`, `NotYourTurn`,
    /// `ResourceDepleted`, and for extend `TimeUnlimited` or `TurnExpired`.
    pub fn use_power(
        &mut self,
        token: &PlayerToken,
        kind: PowerKind,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<PowerOutcome, SessionError> {
        if self.phase != SessionPhase::Active {
            return Err(ValidationError::SessionNotActive.into());
        }
        let role = self.role_of(token).ok_or(ValidationError::NotParticipant)?;
        let now = clock.now();

        match kind {
            PowerKind::Reveal => {
                let budget = self.budgets.for_role(role).consume(kind)?;
                let Some(latest) = self.chain.latest() else {
                    return Err(ValidationError::SessionNotActive.into());
                };
                let item_id = latest.item.id;
                let roster = latest.roster.clone();
                self.record(
                    SessionEventKind::CastRevealed(CastRevealed {
                        session_id: self.id,
                        revealed_by: role,
                        item_id,
                        budget,
                    }),
                    correlation_id,
                    now,
                );
                Ok(PowerOutcome::Revealed(roster))
            }
            PowerKind::Pass => {
                if role != self.turn_owner {
                    return Err(ValidationError::NotYourTurn.into());
                }
                let budget = self.budgets.for_role(role).consume(kind)?;
                self.pass_turn(role, false, budget, correlation_id, now);
                Ok(PowerOutcome::Passed)
            }
            PowerKind::Extend => {
                if role != self.turn_owner {
                    return Err(ValidationError::NotYourTurn.into());
                }
                if self.settings.time_limit.is_unlimited() {
                    return Err(ValidationError::TimeUnlimited.into());
                }
                if self.turn_is_over(now) {
                    return Err(ValidationError::TurnExpired.into());
                }
                let budget = self.budgets.for_role(role).consume(kind)?;
                let bonus_secs = self.settings.extend_bonus_secs;
                let (epoch, bonus_so_far) = self
                    .timer
                    .as_ref()
                    .map_or((now, 0), |t| (t.epoch(), t.bonus_secs()));
                let total_bonus_secs = bonus_so_far.saturating_add(bonus_secs);
                self.record(
                    SessionEventKind::TimeExtended(TimeExtended {
                        session_id: self.id,
                        extended_by: role,
                        bonus_secs,
                        total_bonus_secs,
                        budget,
                        epoch,
                    }),
                    correlation_id,
                    now,
                );
                Ok(PowerOutcome::Extended { total_bonus_secs })
            }
        }
    }

    /// Handles a participant's report that `turn_number` ran out of time.
    ///
    /// The deadline is checked against this session's own clock, then the
    /// configured timeout policy is applied. Reports for a turn that is no
    /// longer running, or that was already handled, change nothing.
    ///
    /// # Errors
    ///
    /// Returns `NotParticipant`, `SessionNotActive` before play, or
    /// `TurnNotExpired` if the deadline has not passed.
    pub fn report_timeout(
        &mut self,
        token: &PlayerToken,
        turn_number: u32,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), SessionError> {
        if self.role_of(token).is_none() {
            return Err(ValidationError::NotParticipant.into());
        }
        match self.phase {
            SessionPhase::Over => return Ok(()),
            SessionPhase::Active => {}
            SessionPhase::Lobby | SessionPhase::Paired => {
                return Err(ValidationError::SessionNotActive.into());
            }
        }
        if turn_number != self.turn_number || self.is_blocked() {
            return Ok(());
        }

        let now = clock.now();
        if !self.timer.as_ref().is_some_and(|t| t.is_expired(now)) {
            return Err(ValidationError::TurnNotExpired.into());
        }

        let player = self.turn_owner;
        self.record(
            SessionEventKind::TurnTimedOut(TurnTimedOut {
                session_id: self.id,
                player,
                turn_number,
            }),
            correlation_id,
            now,
        );

        match self.settings.timeout_policy {
            TimeoutPolicy::BlockTurn => {}
            TimeoutPolicy::ForcePass => {
                let budget = self.budgets.for_role(player);
                self.pass_turn(player, true, budget, correlation_id, now);
            }
            TimeoutPolicy::EndMatch => {
                self.end(EndReason::TimedOut { player }, correlation_id, now);
            }
        }
        Ok(())
    }

    /// Records that a participant dropped and applies the disconnect policy.
    /// Repeated reports and reports after the end change nothing.
    ///
    /// # Errors
    ///
    /// Returns `NotParticipant` for an unknown token.
    pub fn disconnect(
        &mut self,
        token: &PlayerToken,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), SessionError> {
        let player = self.role_of(token).ok_or(ValidationError::NotParticipant)?;
        if self.phase == SessionPhase::Over || self.disconnected.contains(&player) {
            return Ok(());
        }

        let now = clock.now();
        self.record(
            SessionEventKind::PlayerDisconnected(PlayerDisconnected {
                session_id: self.id,
                player,
            }),
            correlation_id,
            now,
        );
        if self.settings.disconnect_policy == DisconnectPolicy::EndSession {
            self.end(EndReason::PlayerDisconnected { player }, correlation_id, now);
        }
        Ok(())
    }

    fn pass_turn(
        &mut self,
        passed_by: PlayerRole,
        forced: bool,
        budget: PowerBudget,
        correlation_id: Uuid,
        now: DateTime<Utc>,
    ) {
        let passed = TurnPassed {
            session_id: self.id,
            passed_by,
            forced,
            budget,
            turn_owner: self.next_turn_owner(),
            turn_number: self.turn_number + 1,
            epoch: now,
        };
        self.record(SessionEventKind::TurnPassed(passed), correlation_id, now);
    }

    fn end(&mut self, reason: EndReason, correlation_id: Uuid, now: DateTime<Utc>) {
        self.record(
            SessionEventKind::SessionEnded(SessionEnded {
                session_id: self.id,
                reason,
            }),
            correlation_id,
            now,
        );
    }

    fn next_turn_owner(&self) -> PlayerRole {
        match self.settings.mode {
            SessionMode::Solo => self.turn_owner,
            SessionMode::Versus => self.turn_owner.opponent(),
        }
    }

    fn turn_is_over(&self, now: DateTime<Utc>) -> bool {
        self.is_blocked() || self.timer.as_ref().is_some_and(|t| t.is_expired(now))
    }

    fn seat(&self, role: PlayerRole) -> Option<&PlayerToken> {
        match role {
            PlayerRole::Host => self.host.as_ref(),
            PlayerRole::Guest => self.guest.as_ref(),
        }
    }

    /// Seat held by `token`, if any.
    #[must_use]
    pub fn role_of(&self, token: &PlayerToken) -> Option<PlayerRole> {
        if self.host.as_ref() == Some(token) {
            Some(PlayerRole::Host)
        } else if self.guest.as_ref() == Some(token) {
            Some(PlayerRole::Guest)
        } else {
            None
        }
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    #[must_use]
    pub fn host(&self) -> Option<&PlayerToken> {
        self.host.as_ref()
    }

    #[must_use]
    pub fn guest(&self) -> Option<&PlayerToken> {
        self.guest.as_ref()
    }

    #[must_use]
    pub fn chain(&self) -> &ChainState {
        &self.chain
    }

    /// Player whose move it is. Meaningful once active.
    #[must_use]
    pub fn turn_owner(&self) -> PlayerRole {
        self.turn_owner
    }

    /// Turn counter, 1 for the first turn.
    #[must_use]
    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    #[must_use]
    pub fn timer(&self) -> Option<&RoundTimer> {
        self.timer.as_ref()
    }

    #[must_use]
    pub fn budgets(&self) -> &PowerBudgets {
        &self.budgets
    }

    /// Whether the running turn's timeout was confirmed under `BlockTurn`.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.phase == SessionPhase::Active && self.timed_out_turn == Some(self.turn_number)
    }

    #[must_use]
    pub fn disconnected(&self) -> &[PlayerRole] {
        &self.disconnected
    }

    #[must_use]
    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    /// The link-set between the two most recently placed items.
    #[must_use]
    pub fn current_frontier(&self) -> &[Link] {
        self.chain.active_frontier()
    }

    #[must_use]
    pub fn usage_count(&self, person_id: PersonId) -> u32 {
        self.chain.usage_count(person_id)
    }

    #[must_use]
    pub fn remaining_power(&self, role: PlayerRole, kind: PowerKind) -> Limit {
        self.budgets.for_role(role).remaining(kind)
    }

    /// Time left in the running turn; `None` when the clock is unlimited or
    /// the game is not in play.
    #[must_use]
    pub fn remaining_time(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        if self.phase != SessionPhase::Active {
            return None;
        }
        self.timer.as_ref().and_then(|t| t.remaining(now))
    }

    fn restore_entry(&mut self, item: Item, roster: Vec<CastMember>, links: Vec<Link>) {
        if let Err(err) = self.chain.restore(item, roster, links) {
            warn!(session_id = %self.id, error = %err, "ignoring inconsistent chain event");
        }
    }

    fn fold(&mut self, kind: &SessionEventKind) {
        match kind {
            SessionEventKind::SessionCreated(payload) => {
                self.settings = payload.settings.clone();
                self.budgets = PowerBudgets::uniform(self.settings.initial_budget());
                self.phase = SessionPhase::Lobby;
            }
            SessionEventKind::PlayerJoined(payload) => match payload.role {
                PlayerRole::Host => self.host = Some(payload.player_token.clone()),
                PlayerRole::Guest => self.guest = Some(payload.player_token.clone()),
            },
            SessionEventKind::SessionPaired(payload) => {
                self.host = Some(payload.host.clone());
                self.guest = Some(payload.guest.clone());
                self.phase = SessionPhase::Paired;
            }
            SessionEventKind::GameStarted(payload) => {
                self.settings = payload.settings.clone();
                self.host = Some(payload.host.clone());
                self.guest.clone_from(&payload.guest);
                self.chain = ChainState::new();
                self.restore_entry(payload.starting_item, payload.roster.clone(), Vec::new());
                self.turn_owner = payload.turn_owner;
                self.turn_number = 1;
                self.timer = Some(RoundTimer::start(payload.epoch, self.settings.time_limit));
                self.budgets = payload.budgets;
                self.timed_out_turn = None;
                self.phase = SessionPhase::Active;
            }
            SessionEventKind::ItemPlaced(payload) => {
                self.restore_entry(payload.item, payload.roster.clone(), payload.links.clone());
                self.begin_turn(payload.turn_owner, payload.turn_number, payload.epoch);
            }
            SessionEventKind::TurnPassed(payload) => {
                self.budgets.set(payload.passed_by, payload.budget);
                self.begin_turn(payload.turn_owner, payload.turn_number, payload.epoch);
            }
            SessionEventKind::TimeExtended(payload) => {
                self.budgets.set(payload.extended_by, payload.budget);
                if let Some(timer) = self.timer.as_mut() {
                    timer.extend(payload.bonus_secs);
                }
            }
            SessionEventKind::CastRevealed(payload) => {
                self.budgets.set(payload.revealed_by, payload.budget);
            }
            SessionEventKind::TurnTimedOut(payload) => {
                self.timed_out_turn = Some(payload.turn_number);
            }
            SessionEventKind::PlayerDisconnected(payload) => {
                if !self.disconnected.contains(&payload.player) {
                    self.disconnected.push(payload.player);
                }
            }
            SessionEventKind::SessionEnded(payload) => {
                self.end_reason = Some(payload.reason);
                self.phase = SessionPhase::Over;
            }
        }
    }

    fn begin_turn(&mut self, owner: PlayerRole, turn_number: u32, epoch: DateTime<Utc>) {
        self.turn_owner = owner;
        self.turn_number = turn_number;
        match self.timer.as_mut() {
            Some(timer) => timer.restart(epoch),
            None => self.timer = Some(RoundTimer::start(epoch, self.settings.time_limit)),
        }
    }
}

impl AggregateRoot for GameSession {
    type Event = SessionEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    /// Folds an event. Redelivered events (at or below the current version)
    /// are ignored, so an at-least-once channel can feed this directly.
    fn apply(&mut self, event: &Self::Event) {
        if event.metadata.sequence_number <= self.version {
            return;
        }
        self.fold(&event.kind);
        self.version = event.metadata.sequence_number;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}
