//! Routes for game sessions: commands, the session view, and the live
//! event stream.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use castchain_chain::{CastMember, ItemId, Link};
use castchain_core::repository::StoredEvent;
use castchain_session::application::{command_handlers, query_handlers};
use castchain_session::domain::aggregates::PowerOutcome;
use castchain_session::domain::commands;
use castchain_session::domain::participants::{PlayerRole, PlayerToken};
use castchain_session::domain::power::PowerKind;
use castchain_session::domain::settings::SessionSettings;
use castchain_session::error::{CoordinationError, SessionError, ValidationError};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::hub::SessionMessage;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    /// Omitted fields take their defaults.
    #[serde(default)]
    pub settings: SessionSettings,
}

/// Request body for commands that only identify the player.
#[derive(Debug, Deserialize)]
pub struct PlayerRequest {
    pub player_token: PlayerToken,
}

/// Request body for POST /{id}/start.
#[derive(Debug, Deserialize)]
pub struct StartGameRequest {
    pub player_token: PlayerToken,
    pub starting_item_id: ItemId,
}

/// Request body for POST /{id}/moves.
#[derive(Debug, Deserialize)]
pub struct ProposeMoveRequest {
    pub player_token: PlayerToken,
    pub item_id: ItemId,
}

/// Request body for POST /{id}/powers.
#[derive(Debug, Deserialize)]
pub struct UsePowerRequest {
    pub player_token: PlayerToken,
    pub kind: PowerKind,
}

/// Request body for POST /{id}/timeout.
#[derive(Debug, Deserialize)]
pub struct ReportTimeoutRequest {
    pub player_token: PlayerToken,
    /// The turn the reporter saw run out.
    pub turn_number: u32,
}

/// Query string of the event stream.
#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// Seated player on the other end. Closing the socket reports them
    /// disconnected; spectators omit it.
    pub player_token: Option<PlayerToken>,
}

/// Response body returned after a command is successfully handled.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// The session the command applied to.
    pub session_id: Uuid,
    /// IDs of the domain events produced and persisted.
    pub event_ids: Vec<Uuid>,
}

/// Response body for POST /{id}/join.
#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub session_id: Uuid,
    pub role: PlayerRole,
    pub opponent: Option<PlayerToken>,
    pub event_ids: Vec<Uuid>,
}

/// Response body for POST /{id}/moves.
#[derive(Debug, Serialize)]
pub struct MoveResponse {
    pub event_ids: Vec<Uuid>,
    /// The link-set the move created.
    pub links: Vec<Link>,
}

/// What a spent power produced.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PowerResult {
    Revealed { cast: Vec<CastMember> },
    Passed,
    Extended { total_bonus_secs: u32 },
}

impl From<PowerOutcome> for PowerResult {
    fn from(outcome: PowerOutcome) -> Self {
        match outcome {
            PowerOutcome::Revealed(cast) => Self::Revealed { cast },
            PowerOutcome::Passed => Self::Passed,
            PowerOutcome::Extended { total_bonus_secs } => Self::Extended { total_bonus_secs },
        }
    }
}

/// Response body for POST /{id}/powers.
#[derive(Debug, Serialize)]
pub struct PowerResponse {
    pub event_ids: Vec<Uuid>,
    #[serde(flatten)]
    pub result: PowerResult,
}

fn event_ids(events: &[StoredEvent]) -> Vec<Uuid> {
    events.iter().map(|e| e.event_id).collect()
}

/// POST /
#[instrument(skip(state, request), fields(mode = ?request.settings.mode))]
async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::CreateSession {
        correlation_id: Uuid::new_v4(),
        settings: request.settings,
    };

    let result = command_handlers::handle_create_session(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(CommandResponse {
        session_id: result.aggregate_id,
        event_ids: event_ids(&result.stored_events),
    }))
}

/// POST /{id}/join
#[instrument(skip(state, request), fields(session_id = %session_id))]
async fn join_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<PlayerRequest>,
) -> Result<Json<JoinResponse>, ApiError> {
    let command = commands::JoinSession {
        correlation_id: Uuid::new_v4(),
        session_id,
        player_token: request.player_token,
    };

    let result = command_handlers::handle_join_session(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;
    state.commit(session_id, &result.stored_events);

    Ok(Json(JoinResponse {
        session_id,
        role: result.outcome.role,
        opponent: result.outcome.opponent,
        event_ids: event_ids(&result.stored_events),
    }))
}

/// POST /{id}/start
#[instrument(skip(state, request), fields(session_id = %session_id))]
async fn start_game(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<StartGameRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::StartGame {
        correlation_id: Uuid::new_v4(),
        session_id,
        player_token: request.player_token,
        starting_item_id: request.starting_item_id,
    };

    let mut rng = state.rng.lock().await;
    let result = command_handlers::handle_start_game(
        &command,
        state.clock.as_ref(),
        &mut *rng,
        &*state.event_repository,
        &*state.catalog,
    )
    .await?;
    drop(rng);
    state.commit(session_id, &result.stored_events);

    Ok(Json(CommandResponse {
        session_id,
        event_ids: event_ids(&result.stored_events),
    }))
}

/// POST /{id}/moves
#[instrument(skip(state, request), fields(session_id = %session_id, item_id = request.item_id))]
async fn propose_move(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ProposeMoveRequest>,
) -> Result<Json<MoveResponse>, ApiError> {
    let command = commands::ProposeMove {
        correlation_id: Uuid::new_v4(),
        session_id,
        player_token: request.player_token,
        item_id: request.item_id,
    };

    let result = command_handlers::handle_propose_move(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
        &*state.catalog,
    )
    .await?;
    state.commit(session_id, &result.stored_events);

    Ok(Json(MoveResponse {
        event_ids: event_ids(&result.stored_events),
        links: result.outcome,
    }))
}

/// POST /{id}/powers
#[instrument(skip(state, request), fields(session_id = %session_id, kind = %request.kind))]
async fn use_power(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<UsePowerRequest>,
) -> Result<Json<PowerResponse>, ApiError> {
    let command = commands::UsePower {
        correlation_id: Uuid::new_v4(),
        session_id,
        player_token: request.player_token,
        kind: request.kind,
    };

    let result = command_handlers::handle_use_power(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;
    state.commit(session_id, &result.stored_events);

    Ok(Json(PowerResponse {
        event_ids: event_ids(&result.stored_events),
        result: result.outcome.into(),
    }))
}

/// POST /{id}/timeout
#[instrument(skip(state, request), fields(session_id = %session_id, turn = request.turn_number))]
async fn report_timeout(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ReportTimeoutRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::ReportTimeout {
        correlation_id: Uuid::new_v4(),
        session_id,
        player_token: request.player_token,
        turn_number: request.turn_number,
    };

    let result = command_handlers::handle_report_timeout(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;
    state.commit(session_id, &result.stored_events);

    Ok(Json(CommandResponse {
        session_id,
        event_ids: event_ids(&result.stored_events),
    }))
}

async fn record_disconnect(
    state: &AppState,
    session_id: Uuid,
    player_token: PlayerToken,
) -> Result<Vec<StoredEvent>, SessionError> {
    let command = commands::ReportDisconnect {
        correlation_id: Uuid::new_v4(),
        session_id,
        player_token,
    };
    let result = command_handlers::handle_report_disconnect(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;
    state.commit(session_id, &result.stored_events);
    Ok(result.stored_events)
}

/// POST /{id}/disconnect
#[instrument(skip(state, request), fields(session_id = %session_id))]
async fn report_disconnect(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<PlayerRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let stored_events = record_disconnect(&state, session_id, request.player_token).await?;

    Ok(Json(CommandResponse {
        session_id,
        event_ids: event_ids(&stored_events),
    }))
}

/// GET /{id}
#[instrument(skip(state))]
async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<query_handlers::SessionView>, ApiError> {
    let view = query_handlers::get_session_by_id(
        session_id,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;
    Ok(Json(view))
}

/// DELETE /{id}
#[instrument(skip(state))]
async fn evict_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    command_handlers::handle_evict_session(session_id, &*state.event_repository).await?;
    state.hub.remove(session_id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /{id}/events
#[instrument(skip(state, ws, query))]
async fn session_events(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<EventsQuery>,
) -> Result<Response, ApiError> {
    let events = state
        .event_repository
        .load_events(session_id)
        .await
        .map_err(SessionError::from)?;
    if events.is_empty() {
        return Err(SessionError::from(CoordinationError::SessionNotFound(session_id)).into());
    }
    if let Some(token) = &query.player_token {
        let session = command_handlers::reconstitute(session_id, &events)
            .map_err(SessionError::from)?;
        if session.role_of(token).is_none() {
            return Err(SessionError::from(ValidationError::NotParticipant).into());
        }
    }

    let receiver = state.hub.subscribe(session_id);
    Ok(ws.on_upgrade(move |socket| {
        stream_session(socket, state, session_id, query.player_token, receiver)
    }))
}

/// Why a live stream stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamEnd {
    /// The client closed the socket or stopped reading.
    ClientLeft,
    /// The session was evicted or its log became unreadable.
    SessionClosed,
}

type EventSink = SplitSink<WebSocket, Message>;

async fn send(sink: &mut EventSink, message: &SessionMessage) -> Result<(), StreamEnd> {
    let text = match serde_json::to_string(message) {
        Ok(text) => text,
        Err(err) => {
            warn!(error = %err, "dropping unserializable event");
            return Ok(());
        }
    };
    sink.send(Message::Text(text.into()))
        .await
        .map_err(|_| StreamEnd::ClientLeft)
}

/// Sends every logged event after `last_sequence`, advancing it.
async fn send_backlog(
    state: &AppState,
    session_id: Uuid,
    last_sequence: &mut i64,
    sink: &mut EventSink,
) -> Result<(), StreamEnd> {
    let events = state
        .event_repository
        .load_events(session_id)
        .await
        .map_err(|err| {
            warn!(%session_id, error = %err, "event log unreadable");
            StreamEnd::SessionClosed
        })?;

    let floor = *last_sequence;
    for event in events.iter().filter(|e| e.sequence_number > floor) {
        send(sink, &SessionMessage::from(event)).await?;
        *last_sequence = event.sequence_number;
    }
    Ok(())
}

/// Replays the log, then relays live events until either side goes away.
/// Live events already covered by the replay are skipped. A live event
/// that skips ahead of the last one sent means another command published
/// late, so the gap is filled from the log instead.
async fn relay(
    socket: WebSocket,
    state: &AppState,
    session_id: Uuid,
    mut receiver: broadcast::Receiver<SessionMessage>,
) -> StreamEnd {
    let (mut sink, mut incoming) = socket.split();
    let mut last_sequence = 0;

    if let Err(end) = send_backlog(state, session_id, &mut last_sequence, &mut sink).await {
        return end;
    }

    loop {
        tokio::select! {
            received = receiver.recv() => match received {
                Ok(message) if message.sequence_number <= last_sequence => {}
                Ok(message) if message.sequence_number > last_sequence + 1 => {
                    debug!(
                        %session_id,
                        last_sequence,
                        received = message.sequence_number,
                        "live event ahead of stream, replaying from the log"
                    );
                    if let Err(end) =
                        send_backlog(state, session_id, &mut last_sequence, &mut sink).await
                    {
                        return end;
                    }
                }
                Ok(message) => {
                    if let Err(end) = send(&mut sink, &message).await {
                        return end;
                    }
                    last_sequence = message.sequence_number;
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(%session_id, skipped, "subscriber lagged, replaying from the log");
                    if let Err(end) =
                        send_backlog(state, session_id, &mut last_sequence, &mut sink).await
                    {
                        return end;
                    }
                }
                Err(RecvError::Closed) => return StreamEnd::SessionClosed,
            },
            frame = incoming.next() => match frame {
                Some(Ok(Message::Close(_)) | Err(_)) | None => return StreamEnd::ClientLeft,
                Some(Ok(_)) => {}
            },
        }
    }
}

async fn stream_session(
    socket: WebSocket,
    state: AppState,
    session_id: Uuid,
    player_token: Option<PlayerToken>,
    receiver: broadcast::Receiver<SessionMessage>,
) {
    info!(%session_id, player = ?player_token, "event stream opened");
    if let Some(token) = &player_token {
        state.hub.attach(session_id, token);
    }
    let end = relay(socket, &state, session_id, receiver).await;
    info!(%session_id, ?end, "event stream closed");

    let Some(token) = player_token else {
        return;
    };
    let still_open = state.hub.detach(session_id, &token);
    if end != StreamEnd::ClientLeft || still_open > 0 {
        debug!(%session_id, still_open, "player still connected or session closed");
        return;
    }
    if let Err(err) = record_disconnect(&state, session_id, token).await {
        debug!(%session_id, error = %err, "disconnect not recorded");
    }
}

/// Returns the router for sessions.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_session))
        .route("/{id}", get(get_session).delete(evict_session))
        .route("/{id}/join", post(join_session))
        .route("/{id}/start", post(start_game))
        .route("/{id}/moves", post(propose_move))
        .route("/{id}/powers", post(use_power))
        .route("/{id}/timeout", post(report_timeout))
        .route("/{id}/disconnect", post(report_disconnect))
        .route("/{id}/events", get(session_events))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use castchain_catalog::CatalogGateway;
    use castchain_core::clock::Clock;
    use castchain_core::repository::EventRepository;
    use castchain_core::rng::DeterministicRng;
    use castchain_event_store::InMemoryEventRepository;
    use castchain_test_support::{
        FailingEventRepository, FixedClock, MockRng, StaticCatalog, supporting_roster,
    };
    use chrono::{TimeZone, Utc};
    use serde_json::{Value, json};
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    use super::*;

    fn catalog() -> StaticCatalog {
        StaticCatalog::new()
            .with_roster(100, supporting_roster(&[1, 2]))
            .with_roster(200, supporting_roster(&[2, 3]))
            .with_roster(300, supporting_roster(&[3, 4]))
            .with_roster(400, supporting_roster(&[9]))
            .failing(500)
    }

    fn app_state_with(event_repository: Arc<dyn EventRepository>) -> AppState {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        ));
        let rng: Arc<Mutex<dyn DeterministicRng>> = Arc::new(Mutex::new(MockRng));
        let catalog: Arc<dyn CatalogGateway> = Arc::new(catalog());
        AppState::new(clock, rng, event_repository, catalog)
    }

    fn test_app_state() -> AppState {
        app_state_with(Arc::new(InMemoryEventRepository::new()))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, json)
    }

    /// Creates, pairs and starts a session from item 100 with alice to move.
    async fn started_session(app: &Router) -> String {
        let (_, json) = call(app, "POST", "/", Some(json!({}))).await;
        let id = json["session_id"].as_str().unwrap().to_owned();
        call(app, "POST", &format!("/{id}/join"), Some(json!({ "player_token": "alice" }))).await;
        call(app, "POST", &format!("/{id}/join"), Some(json!({ "player_token": "bob" }))).await;
        let (status, _) = call(
            app,
            "POST",
            &format!("/{id}/start"),
            Some(json!({ "player_token": "alice", "starting_item_id": 100 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        id
    }

    #[tokio::test]
    async fn test_create_session_returns_200_with_session_id() {
        // Arrange
        let app = router().with_state(test_app_state());

        // Act
        let (status, json) = call(&app, "POST", "/", Some(json!({}))).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        Uuid::parse_str(json["session_id"].as_str().unwrap()).unwrap();
        assert_eq!(json["event_ids"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_session_keeps_partial_settings() {
        // Arrange
        let app = router().with_state(test_app_state());
        let body = json!({
            "settings": { "mode": "solo", "link_limit": { "type": "unlimited" } }
        });

        // Act
        let (_, json) = call(&app, "POST", "/", Some(body)).await;
        let id = json["session_id"].as_str().unwrap();
        let (status, view) = call(&app, "GET", &format!("/{id}"), None).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["phase"], "lobby");
        assert_eq!(view["settings"]["mode"], "solo");
        assert_eq!(view["settings"]["link_limit"]["type"], "unlimited");
        assert_eq!(view["settings"]["pass_limit"]["amount"], 1);
    }

    #[tokio::test]
    async fn test_join_returns_roles_and_opponent() {
        // Arrange
        let app = router().with_state(test_app_state());
        let (_, json) = call(&app, "POST", "/", Some(json!({}))).await;
        let id = json["session_id"].as_str().unwrap().to_owned();

        // Act
        let (_, host) = call(&app, "POST", &format!("/{id}/join"), Some(json!({ "player_token": "alice" }))).await;
        let (_, guest) = call(&app, "POST", &format!("/{id}/join"), Some(json!({ "player_token": "bob" }))).await;
        let (status, third) = call(&app, "POST", &format!("/{id}/join"), Some(json!({ "player_token": "carol" }))).await;

        // Assert
        assert_eq!(host["role"], "host");
        assert_eq!(host["opponent"], Value::Null);
        assert_eq!(guest["role"], "guest");
        assert_eq!(guest["opponent"], "alice");
        assert_eq!(guest["event_ids"].as_array().unwrap().len(), 2);
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(third["error"], "session_full");
    }

    #[tokio::test]
    async fn test_join_unknown_session_returns_404() {
        let app = router().with_state(test_app_state());

        let (status, json) = call(
            &app,
            "POST",
            &format!("/{}/join", Uuid::new_v4()),
            Some(json!({ "player_token": "alice" })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "session_not_found");
    }

    #[tokio::test]
    async fn test_join_returns_422_for_missing_token() {
        let app = router().with_state(test_app_state());

        let (status, _) = call(
            &app,
            "POST",
            &format!("/{}/join", Uuid::new_v4()),
            Some(json!({})),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_accepted_move_returns_links_and_publishes() {
        // Arrange
        let state = test_app_state();
        let app = router().with_state(state.clone());
        let id = started_session(&app).await;
        let mut listener = state.hub.subscribe(id.parse().unwrap());

        // Act
        let (status, json) = call(
            &app,
            "POST",
            &format!("/{id}/moves"),
            Some(json!({ "player_token": "alice", "item_id": 200 })),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["links"][0]["person_id"], 2);
        let message = listener.try_recv().unwrap();
        assert_eq!(message.event_type, "session.item_placed");
        assert_eq!(message.sequence_number, 6);
    }

    #[tokio::test]
    async fn test_rejected_move_is_reported_only_to_proposer() {
        // Arrange
        let state = test_app_state();
        let app = router().with_state(state.clone());
        let id = started_session(&app).await;
        let mut listener = state.hub.subscribe(id.parse().unwrap());

        // Act
        let (out_of_turn, turn_json) = call(
            &app,
            "POST",
            &format!("/{id}/moves"),
            Some(json!({ "player_token": "bob", "item_id": 200 })),
        )
        .await;
        let (unrelated, cast_json) = call(
            &app,
            "POST",
            &format!("/{id}/moves"),
            Some(json!({ "player_token": "alice", "item_id": 400 })),
        )
        .await;

        // Assert
        assert_eq!(out_of_turn, StatusCode::CONFLICT);
        assert_eq!(turn_json["error"], "not_your_turn");
        assert_eq!(unrelated, StatusCode::BAD_REQUEST);
        assert_eq!(cast_json["error"], "no_shared_cast");
        assert!(listener.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_catalog_failure_returns_502() {
        let app = router().with_state(test_app_state());
        let id = started_session(&app).await;

        let (status, json) = call(
            &app,
            "POST",
            &format!("/{id}/moves"),
            Some(json!({ "player_token": "alice", "item_id": 500 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"], "upstream_error");
    }

    #[tokio::test]
    async fn test_reveal_returns_latest_cast() {
        // Arrange
        let app = router().with_state(test_app_state());
        let id = started_session(&app).await;

        // Act
        let (status, json) = call(
            &app,
            "POST",
            &format!("/{id}/powers"),
            Some(json!({ "player_token": "bob", "kind": "reveal" })),
        )
        .await;
        let (again, depleted) = call(
            &app,
            "POST",
            &format!("/{id}/powers"),
            Some(json!({ "player_token": "bob", "kind": "reveal" })),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["outcome"], "revealed");
        assert_eq!(json["cast"].as_array().unwrap().len(), 2);
        assert_eq!(again, StatusCode::BAD_REQUEST);
        assert_eq!(depleted["error"], "resource_depleted");
    }

    #[tokio::test]
    async fn test_pass_flips_turn_in_view() {
        // Arrange
        let app = router().with_state(test_app_state());
        let id = started_session(&app).await;

        // Act
        let (status, json) = call(
            &app,
            "POST",
            &format!("/{id}/powers"),
            Some(json!({ "player_token": "alice", "kind": "pass" })),
        )
        .await;
        let (_, view) = call(&app, "GET", &format!("/{id}"), None).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["outcome"], "passed");
        assert_eq!(view["turn_owner"], "guest");
        assert_eq!(view["turn_number"], 2);
        assert_eq!(view["budgets"]["host"]["pass"]["amount"], 0);
    }

    #[tokio::test]
    async fn test_timeout_before_deadline_is_rejected() {
        let app = router().with_state(test_app_state());
        let id = started_session(&app).await;

        let (status, json) = call(
            &app,
            "POST",
            &format!("/{id}/timeout"),
            Some(json!({ "player_token": "bob", "turn_number": 1 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "turn_not_expired");
    }

    #[tokio::test]
    async fn test_disconnect_ends_session_by_default() {
        // Arrange
        let app = router().with_state(test_app_state());
        let id = started_session(&app).await;

        // Act
        let (status, json) = call(
            &app,
            "POST",
            &format!("/{id}/disconnect"),
            Some(json!({ "player_token": "bob" })),
        )
        .await;
        let (_, view) = call(&app, "GET", &format!("/{id}"), None).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["event_ids"].as_array().unwrap().len(), 2);
        assert_eq!(view["phase"], "over");
        assert_eq!(view["end_reason"]["reason"], "player_disconnected");
        assert_eq!(view["end_reason"]["player"], "guest");
    }

    #[tokio::test]
    async fn test_evict_then_get_returns_404() {
        // Arrange
        let app = router().with_state(test_app_state());
        let (_, json) = call(&app, "POST", "/", Some(json!({}))).await;
        let id = json["session_id"].as_str().unwrap().to_owned();

        // Act
        let (deleted, _) = call(&app, "DELETE", &format!("/{id}"), None).await;
        let (status, _) = call(&app, "GET", &format!("/{id}"), None).await;
        let (again, _) = call(&app, "DELETE", &format!("/{id}"), None).await;

        // Assert
        assert_eq!(deleted, StatusCode::NO_CONTENT);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(again, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_failing_repository_returns_500() {
        let app = router().with_state(app_state_with(Arc::new(FailingEventRepository)));

        let (status, json) = call(&app, "POST", "/", Some(json!({}))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "infrastructure_error");
    }
}
