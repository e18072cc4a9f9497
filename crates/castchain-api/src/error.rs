//! Castchain API — error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use castchain_catalog::CatalogError;
use castchain_chain::PersonId;
use castchain_core::error::DomainError;
use castchain_session::error::{CoordinationError, SessionError, ValidationError};
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Persons named by an exhausted-links rejection.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub person_ids: Vec<PersonId>,
}

/// HTTP-layer wrapper around `SessionError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub SessionError);

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        Self(err)
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        Self(err.into())
    }
}

fn validation_code(err: &ValidationError) -> &'static str {
    match err {
        ValidationError::DuplicateItem(_) => "duplicate_item",
        ValidationError::NoSharedCast => "no_shared_cast",
        ValidationError::AllLinksExhausted(_) => "all_links_exhausted",
        ValidationError::NotYourTurn => "not_your_turn",
        ValidationError::ResourceDepleted(_) => "resource_depleted",
        ValidationError::NotParticipant => "not_participant",
        ValidationError::NotHost => "not_host",
        ValidationError::OpponentMissing => "opponent_missing",
        ValidationError::SessionNotActive => "session_not_active",
        ValidationError::AlreadyStarted => "already_started",
        ValidationError::TurnExpired => "turn_expired",
        ValidationError::TurnNotExpired => "turn_not_expired",
        ValidationError::TimeUnlimited => "time_unlimited",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            SessionError::Validation(ValidationError::NotYourTurn) => {
                (StatusCode::CONFLICT, "not_your_turn")
            }
            SessionError::Validation(err) => (StatusCode::BAD_REQUEST, validation_code(err)),
            SessionError::Coordination(CoordinationError::SessionFull) => {
                (StatusCode::CONFLICT, "session_full")
            }
            SessionError::Coordination(CoordinationError::SessionNotFound(_))
            | SessionError::Domain(DomainError::AggregateNotFound(_)) => {
                (StatusCode::NOT_FOUND, "session_not_found")
            }
            SessionError::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream_error"),
            SessionError::Domain(DomainError::ConcurrencyConflict { .. }) => {
                (StatusCode::CONFLICT, "concurrency_conflict")
            }
            SessionError::Domain(DomainError::Infrastructure(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        };

        let person_ids = match &self.0 {
            SessionError::Validation(err) => err.exhausted_person_ids(),
            _ => Vec::new(),
        };

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
            person_ids,
        };

        (status, Json(body)).into_response()
    }
}
