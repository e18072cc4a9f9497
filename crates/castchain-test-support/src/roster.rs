//! Roster builders. Every person is named `Person {id}`.

use castchain_chain::{CastMember, PersonId, Role};

/// One roster row for `person_id` voicing `character`.
#[must_use]
pub fn cast_member(person_id: PersonId, character: &str, role: Role) -> CastMember {
    CastMember {
        person_id,
        person_name: format!("Person {person_id}"),
        person_image_url: None,
        character_name: character.to_owned(),
        character_image_url: None,
        role,
    }
}

/// A roster with one supporting row per person.
#[must_use]
pub fn supporting_roster(person_ids: &[PersonId]) -> Vec<CastMember> {
    person_ids
        .iter()
        .map(|id| cast_member(*id, &format!("Character {id}"), Role::Supporting))
        .collect()
}
