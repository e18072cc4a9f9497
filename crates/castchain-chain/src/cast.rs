//! Cast vocabulary shared by the chain, the catalog and the session.

use serde::{Deserialize, Serialize};

/// Catalog identifier of an item (a show).
pub type ItemId = u64;

/// Catalog identifier of a person (a voice actor).
pub type PersonId = u64;

/// One node of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    /// Opaque catalog identifier.
    pub id: ItemId,
}

impl Item {
    /// Wraps a catalog identifier.
    #[must_use]
    pub const fn new(id: ItemId) -> Self {
        Self { id }
    }
}

/// Billing of a character within an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A lead character.
    Main,
    /// Everyone else.
    Supporting,
}

impl Role {
    /// Contribution of this billing to a link's importance.
    #[must_use]
    pub const fn weight(self) -> u8 {
        match self {
            Self::Main => 2,
            Self::Supporting => 1,
        }
    }
}

/// One roster row: a person voicing a character in a given role.
///
/// A person may appear in several rows of the same roster when they voice
/// more than one character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastMember {
    pub person_id: PersonId,
    pub person_name: String,
    pub person_image_url: Option<String>,
    pub character_name: String,
    pub character_image_url: Option<String>,
    pub role: Role,
}

impl CastMember {
    /// The character half of this row.
    #[must_use]
    pub fn character(&self) -> CharacterRef {
        CharacterRef {
            name: self.character_name.clone(),
            image_url: self.character_image_url.clone(),
            role: self.role,
        }
    }
}

/// A character through which a person connects to a neighbouring item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRef {
    pub name: String,
    pub image_url: Option<String>,
    pub role: Role,
}
