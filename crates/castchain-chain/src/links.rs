//! Link engine: shared cast between two rosters.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::cast::{CastMember, CharacterRef, PersonId, Role};

/// One person shared by two adjacent items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// The shared person.
    pub person_id: PersonId,
    /// Name taken from the preferred roster row (see [`compute_links`]).
    pub display_name: String,
    /// Image taken from the same row as `display_name`.
    pub display_image_url: Option<String>,
    /// Every character the person voices in the `from` roster.
    pub from_characters: Vec<CharacterRef>,
    /// Every character the person voices in the `to` roster.
    pub to_characters: Vec<CharacterRef>,
    /// Sum of both sides' billing weight, 2..=4.
    pub importance: u8,
}

/// Computes the links between two rosters.
///
/// A person is linked iff their id appears in both rosters. When a person
/// has several rows on one side, a `Main` row wins for display: the `from`
/// side is consulted first, then the `to` side, and without any `Main` row
/// the first `from` row is used. Each side contributes 2 to the importance
/// if any of its rows is `Main`, 1 otherwise.
///
/// Links come out in descending importance; equal importance keeps the
/// order in which the persons first appear in `from`.
#[must_use]
pub fn compute_links(from: &[CastMember], to: &[CastMember]) -> Vec<Link> {
    let to_ids: HashSet<PersonId> = to.iter().map(|m| m.person_id).collect();

    let mut groups: Vec<(PersonId, Vec<&CastMember>)> = Vec::new();
    for member in from.iter().filter(|m| to_ids.contains(&m.person_id)) {
        match groups.iter_mut().find(|(id, _)| *id == member.person_id) {
            Some((_, rows)) => rows.push(member),
            None => groups.push((member.person_id, vec![member])),
        }
    }

    let mut links: Vec<Link> = groups
        .into_iter()
        .map(|(person_id, from_rows)| {
            let to_rows: Vec<&CastMember> =
                to.iter().filter(|m| m.person_id == person_id).collect();
            build_link(person_id, &from_rows, &to_rows)
        })
        .collect();

    // `sort_by` is stable: ties stay in discovery order.
    links.sort_by(|a, b| b.importance.cmp(&a.importance));
    links
}

fn build_link(person_id: PersonId, from_rows: &[&CastMember], to_rows: &[&CastMember]) -> Link {
    let display = from_rows
        .iter()
        .chain(to_rows)
        .find(|m| m.role == Role::Main)
        .unwrap_or(&from_rows[0]);

    Link {
        person_id,
        display_name: display.person_name.clone(),
        display_image_url: display.person_image_url.clone(),
        from_characters: from_rows.iter().map(|m| m.character()).collect(),
        to_characters: to_rows.iter().map(|m| m.character()).collect(),
        importance: side_weight(from_rows) + side_weight(to_rows),
    }
}

fn side_weight(rows: &[&CastMember]) -> u8 {
    if rows.iter().any(|m| m.role == Role::Main) {
        Role::Main.weight()
    } else {
        Role::Supporting.weight()
    }
}
