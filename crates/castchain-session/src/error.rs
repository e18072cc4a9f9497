//! Session error taxonomy.
//!
//! Validation errors are recoverable rejections reported only to the
//! player who caused them. Coordination errors fail a join attempt or a
//! lookup of the session itself. Upstream errors come from the catalog and
//! are worth retrying.

use castchain_catalog::CatalogError;
use castchain_chain::{ChainError, ItemId, PersonId};
use castchain_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::power::PowerKind;

/// A shared person who can no longer link items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExhaustedPerson {
    pub person_id: PersonId,
    pub display_name: String,
    pub times_used: u32,
}

fn describe(persons: &[ExhaustedPerson]) -> String {
    persons
        .iter()
        .map(|p| format!("{} (#{}, used {}x)", p.display_name, p.person_id, p.times_used))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A move or action that breaks the rules. Nothing was changed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("item {0} is already in the chain")]
    DuplicateItem(ItemId),

    #[error("no voice actor is shared with the previous item")]
    NoSharedCast,

    /// Cast overlaps, but every shared person is at the link limit.
    #[error("every shared voice actor has reached the link limit: {}", describe(.0))]
    AllLinksExhausted(Vec<ExhaustedPerson>),

    #[error("it is not your turn")]
    NotYourTurn,

    #[error("no {0} uses left")]
    ResourceDepleted(PowerKind),

    #[error("player is not seated in this session")]
    NotParticipant,

    #[error("only the host can start the game")]
    NotHost,

    #[error("the game needs an opponent before it can start")]
    OpponentMissing,

    #[error("the session is not in play")]
    SessionNotActive,

    #[error("the game has already started")]
    AlreadyStarted,

    #[error("the turn has run out of time")]
    TurnExpired,

    #[error("the turn still has time left")]
    TurnNotExpired,

    #[error("the turn clock is unlimited")]
    TimeUnlimited,
}

impl ValidationError {
    /// Ids named by an `AllLinksExhausted` rejection; empty otherwise.
    #[must_use]
    pub fn exhausted_person_ids(&self) -> Vec<PersonId> {
        match self {
            Self::AllLinksExhausted(persons) => persons.iter().map(|p| p.person_id).collect(),
            _ => Vec::new(),
        }
    }
}

impl From<ChainError> for ValidationError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::DuplicateItem(item_id) => Self::DuplicateItem(item_id),
        }
    }
}

/// Failures of the session lookup or seating itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinationError {
    #[error("session is full")]
    SessionFull,

    #[error("session not found: {0}")]
    SessionNotFound(Uuid),
}

/// Everything a session command can fail with.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Coordination(#[from] CoordinationError),

    #[error(transparent)]
    Upstream(#[from] CatalogError),

    #[error(transparent)]
    Domain(DomainError),
}

impl From<DomainError> for SessionError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::AggregateNotFound(id) => {
                Self::Coordination(CoordinationError::SessionNotFound(id))
            }
            other => Self::Domain(other),
        }
    }
}

impl From<ChainError> for SessionError {
    fn from(err: ChainError) -> Self {
        Self::Validation(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_links_exhausted_message_names_every_person() {
        // Arrange
        let err = ValidationError::AllLinksExhausted(vec![
            ExhaustedPerson {
                person_id: 7,
                display_name: "Hanazawa Kana".to_owned(),
                times_used: 3,
            },
            ExhaustedPerson {
                person_id: 9,
                display_name: "Kamiya Hiroshi".to_owned(),
                times_used: 3,
            },
        ]);

        // Act
        let message = err.to_string();

        // Assert
        assert!(message.contains("Hanazawa Kana (#7"));
        assert!(message.contains("Kamiya Hiroshi (#9"));
        assert_eq!(err.exhausted_person_ids(), vec![7, 9]);
    }

    #[test]
    fn test_aggregate_not_found_becomes_session_not_found() {
        let id = Uuid::new_v4();

        let err = SessionError::from(DomainError::AggregateNotFound(id));

        match err {
            SessionError::Coordination(CoordinationError::SessionNotFound(found)) => {
                assert_eq!(found, id);
            }
            other => panic!("expected SessionNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_item_maps_to_validation() {
        let err = SessionError::from(ChainError::DuplicateItem(4));

        assert!(matches!(
            err,
            SessionError::Validation(ValidationError::DuplicateItem(4))
        ));
    }
}
