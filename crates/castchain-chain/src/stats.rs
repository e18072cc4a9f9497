//! Chain statistics shown at the end of a game.

use serde::Serialize;

use crate::cast::PersonId;

/// How often a person has linked items so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonUsage {
    pub person_id: PersonId,
    pub display_name: String,
    pub count: u32,
}

/// Summary of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainStats {
    /// Number of placed items.
    pub item_count: usize,
    /// The person with the highest usage; the earliest discovered wins ties.
    pub most_used: Option<PersonUsage>,
}
