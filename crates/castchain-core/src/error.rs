//! Plumbing error types shared by every context.

use thiserror::Error;
use uuid::Uuid;

/// Failures that are not game rules: missing streams, lost races and
/// broken storage.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No event stream exists for the aggregate.
    #[error("aggregate not found: {0}")]
    AggregateNotFound(Uuid),

    /// Another writer appended to the stream first.
    #[error("concurrency conflict on aggregate {aggregate_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The aggregate that had the conflict.
        aggregate_id: Uuid,
        /// The version the writer decided against.
        expected: i64,
        /// The version found in the store.
        actual: i64,
    },

    /// An infrastructure or (de)serialization failure.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
