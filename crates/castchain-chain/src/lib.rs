//! Castchain — chain context.
//!
//! Cast rosters, the link engine that finds shared voice actors between two
//! rosters, and the append-only chain of placed items with its memoized
//! link-sets and usage counters. Everything here is synchronous and pure;
//! rosters arrive already normalized by the catalog gateway.

pub mod cast;
pub mod chain;
pub mod error;
pub mod links;
pub mod stats;

pub use cast::{CastMember, CharacterRef, Item, ItemId, PersonId, Role};
pub use chain::{ChainEntry, ChainState};
pub use error::ChainError;
pub use links::{Link, compute_links};
pub use stats::{ChainStats, PersonUsage};
