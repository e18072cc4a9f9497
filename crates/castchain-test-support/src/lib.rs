//! Shared test mocks and utilities for Castchain.

mod catalog;
mod clock;
mod repository;
mod rng;
mod roster;

pub use catalog::StaticCatalog;
pub use clock::FixedClock;
pub use repository::{
    ConflictingEventRepository, EmptyEventRepository, FailingEventRepository,
    RacingEventRepository, RecordingEventRepository,
};
pub use rng::{CoinRng, MockRng};
pub use roster::{cast_member, supporting_roster};
