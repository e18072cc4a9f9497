//! The append-only chain of placed items.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cast::{CastMember, Item, ItemId, PersonId};
use crate::error::ChainError;
use crate::links::{Link, compute_links};
use crate::stats::{ChainStats, PersonUsage};

/// A placed item together with its resolved roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEntry {
    pub item: Item,
    pub roster: Vec<CastMember>,
}

/// Ordered items (oldest first) plus one memoized link-set per adjacent pair.
///
/// Invariant: `link_sets[i]` links `entries[i]` to `entries[i + 1]`, so
/// `link_sets.len() == entries.len().saturating_sub(1)`. Link-sets are
/// computed once when an item is appended and never recomputed.
#[derive(Debug, Clone, Default)]
pub struct ChainState {
    entries: Vec<ChainEntry>,
    link_sets: Vec<Vec<Link>>,
    usage: HashMap<PersonId, u32>,
}

impl ChainState {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of placed items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no item has been placed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `item_id` is already placed.
    #[must_use]
    pub fn contains(&self, item_id: ItemId) -> bool {
        self.entries.iter().any(|e| e.item.id == item_id)
    }

    /// Placed entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[ChainEntry] {
        &self.entries
    }

    /// Memoized link-sets, parallel to consecutive entry pairs.
    #[must_use]
    pub fn link_sets(&self) -> &[Vec<Link>] {
        &self.link_sets
    }

    /// The most recently placed entry.
    #[must_use]
    pub fn latest(&self) -> Option<&ChainEntry> {
        self.entries.last()
    }

    /// The link-set between the two most recently placed items; empty until
    /// a second item exists.
    #[must_use]
    pub fn active_frontier(&self) -> &[Link] {
        self.link_sets.last().map_or(&[], Vec::as_slice)
    }

    /// Links a candidate roster would form with the most recent item,
    /// without touching the chain.
    #[must_use]
    pub fn candidate_links(&self, roster: &[CastMember]) -> Vec<Link> {
        self.latest()
            .map(|latest| compute_links(&latest.roster, roster))
            .unwrap_or_default()
    }

    /// Appends an item and computes the one new link-set it creates.
    ///
    /// Returns the new link-set (empty for the first item).
    ///
    /// # Errors
    ///
    /// Returns `ChainError::DuplicateItem` if the item is already placed.
    pub fn append(&mut self, item: Item, roster: Vec<CastMember>) -> Result<&[Link], ChainError> {
        let links = self.candidate_links(&roster);
        self.restore(item, roster, links)?;
        Ok(self.active_frontier())
    }

    /// Appends an item whose link-set was computed earlier, e.g. when
    /// replaying recorded events.
    ///
    /// # Errors
    ///
    /// Returns `ChainError::DuplicateItem` if the item is already placed.
    pub fn restore(
        &mut self,
        item: Item,
        roster: Vec<CastMember>,
        links: Vec<Link>,
    ) -> Result<(), ChainError> {
        if self.contains(item.id) {
            return Err(ChainError::DuplicateItem(item.id));
        }

        let had_predecessor = !self.entries.is_empty();
        self.entries.push(ChainEntry { item, roster });

        if had_predecessor {
            for link in &links {
                *self.usage.entry(link.person_id).or_insert(0) += 1;
            }
            debug!(item_id = item.id, links = links.len(), "link-set memoized");
            self.link_sets.push(links);
        }
        Ok(())
    }

    /// How many link-sets so far contain `person_id`.
    #[must_use]
    pub fn usage_count(&self, person_id: PersonId) -> u32 {
        self.usage.get(&person_id).copied().unwrap_or(0)
    }

    /// Usage of `person_id` across link-sets `0..=index`, i.e. the count as it
    /// stood right after that link-set was placed.
    #[must_use]
    pub fn usage_through(&self, index: usize, person_id: PersonId) -> u32 {
        let count = self
            .link_sets
            .iter()
            .take(index + 1)
            .filter(|set| set.iter().any(|l| l.person_id == person_id))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Summary statistics for the chain so far.
    #[must_use]
    pub fn stats(&self) -> ChainStats {
        let mut seen: Vec<(PersonId, &str)> = Vec::new();
        for link in self.link_sets.iter().flatten() {
            if !seen.iter().any(|(id, _)| *id == link.person_id) {
                seen.push((link.person_id, link.display_name.as_str()));
            }
        }

        let mut most_used: Option<PersonUsage> = None;
        for (person_id, name) in seen {
            let count = self.usage_count(person_id);
            if most_used.as_ref().is_none_or(|best| count > best.count) {
                most_used = Some(PersonUsage {
                    person_id,
                    display_name: name.to_owned(),
                    count,
                });
            }
        }

        ChainStats {
            item_count: self.entries.len(),
            most_used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cast::Role;

    fn member(person_id: PersonId, character: &str) -> CastMember {
        CastMember {
            person_id,
            person_name: format!("person {person_id}"),
            person_image_url: None,
            character_name: character.to_owned(),
            character_image_url: None,
            role: Role::Supporting,
        }
    }

    fn roster(person_ids: &[PersonId]) -> Vec<CastMember> {
        person_ids.iter().map(|id| member(*id, "someone")).collect()
    }

    #[test]
    fn test_first_item_creates_no_link_set() {
        // Arrange
        let mut chain = ChainState::new();

        // Act
        let links = chain.append(Item::new(1), roster(&[7, 8])).unwrap().to_vec();

        // Assert
        assert!(links.is_empty());
        assert_eq!(chain.len(), 1);
        assert!(chain.link_sets().is_empty());
        assert!(chain.active_frontier().is_empty());
    }

    #[test]
    fn test_append_memoizes_one_link_set_per_pair() {
        // Arrange
        let mut chain = ChainState::new();
        chain.append(Item::new(1), roster(&[7, 8])).unwrap();

        // Act
        chain.append(Item::new(2), roster(&[8, 9])).unwrap();
        let before = chain.link_sets()[0].clone();
        chain.append(Item::new(3), roster(&[9, 10])).unwrap();

        // Assert
        assert_eq!(chain.link_sets().len(), chain.len() - 1);
        assert_eq!(chain.link_sets()[0], before);
        assert_eq!(chain.link_sets()[0][0].person_id, 8);
        assert_eq!(chain.active_frontier()[0].person_id, 9);
    }

    #[test]
    fn test_duplicate_item_is_rejected_without_mutation() {
        // Arrange
        let mut chain = ChainState::new();
        chain.append(Item::new(1), roster(&[7])).unwrap();
        chain.append(Item::new(2), roster(&[7])).unwrap();

        // Act
        let result = chain.append(Item::new(1), roster(&[7]));

        // Assert
        assert_eq!(result.unwrap_err(), ChainError::DuplicateItem(1));
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.usage_count(7), 1);
    }

    #[test]
    fn test_usage_count_is_cumulative_and_bounded_by_link_sets() {
        // Arrange
        let mut chain = ChainState::new();
        chain.append(Item::new(1), roster(&[7])).unwrap();
        let mut previous = 0;

        for id in 2..=6 {
            // Act
            chain.append(Item::new(id), roster(&[7])).unwrap();

            // Assert
            let count = chain.usage_count(7);
            assert!(count >= previous);
            assert!(count as usize <= chain.link_sets().len());
            previous = count;
        }
        assert_eq!(chain.usage_count(7), 5);
        assert_eq!(chain.usage_count(99), 0);
    }

    #[test]
    fn test_person_with_several_characters_counts_once_per_link_set() {
        let mut chain = ChainState::new();
        chain
            .append(Item::new(1), vec![member(7, "a"), member(7, "b")])
            .unwrap();
        chain
            .append(Item::new(2), vec![member(7, "c"), member(7, "d")])
            .unwrap();

        assert_eq!(chain.usage_count(7), 1);
    }

    #[test]
    fn test_usage_count_matches_sum_over_link_sets() {
        // Arrange
        let mut chain = ChainState::new();
        chain.append(Item::new(1), roster(&[1, 2, 3])).unwrap();
        chain.append(Item::new(2), roster(&[1, 2])).unwrap();
        chain.append(Item::new(3), roster(&[2, 3])).unwrap();
        chain.append(Item::new(4), roster(&[2, 3])).unwrap();

        // Act / Assert
        for person in [1, 2, 3] {
            let summed = chain
                .link_sets()
                .iter()
                .flatten()
                .filter(|l| l.person_id == person)
                .count();
            assert_eq!(chain.usage_count(person) as usize, summed);
        }
        assert_eq!(chain.usage_through(0, 2), 1);
        assert_eq!(chain.usage_through(2, 2), 3);
        assert_eq!(chain.usage_through(1, 3), 0);
        assert_eq!(chain.usage_through(2, 3), 1);
    }

    #[test]
    fn test_restore_uses_supplied_links_verbatim() {
        // Arrange
        let mut source = ChainState::new();
        source.append(Item::new(1), roster(&[4, 5])).unwrap();
        source.append(Item::new(2), roster(&[5])).unwrap();

        let mut replica = ChainState::new();

        // Act
        for (i, entry) in source.entries().iter().enumerate() {
            let links = if i == 0 {
                Vec::new()
            } else {
                source.link_sets()[i - 1].clone()
            };
            replica
                .restore(entry.item, entry.roster.clone(), links)
                .unwrap();
        }

        // Assert
        assert_eq!(replica.link_sets(), source.link_sets());
        assert_eq!(replica.usage_count(5), 1);
    }

    #[test]
    fn test_candidate_links_do_not_mutate() {
        let mut chain = ChainState::new();
        chain.append(Item::new(1), roster(&[1, 2])).unwrap();

        let links = chain.candidate_links(&roster(&[2, 3]));

        assert_eq!(links.len(), 1);
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.usage_count(2), 0);
    }

    #[test]
    fn test_stats_report_most_used_person() {
        // Arrange
        let mut chain = ChainState::new();
        chain.append(Item::new(1), roster(&[1, 2])).unwrap();
        chain.append(Item::new(2), roster(&[1, 2])).unwrap();
        chain.append(Item::new(3), roster(&[2])).unwrap();

        // Act
        let stats = chain.stats();

        // Assert
        assert_eq!(stats.item_count, 3);
        let most = stats.most_used.unwrap();
        assert_eq!(most.person_id, 2);
        assert_eq!(most.count, 2);
    }

    #[test]
    fn test_stats_tie_goes_to_earliest_discovered_person() {
        let mut chain = ChainState::new();
        chain.append(Item::new(1), roster(&[1, 2])).unwrap();
        chain.append(Item::new(2), roster(&[1, 2])).unwrap();

        let most = chain.stats().most_used.unwrap();

        assert_eq!(most.person_id, 1);
        assert_eq!(most.count, 1);
    }

    #[test]
    fn test_stats_on_single_item_chain_have_no_person() {
        let mut chain = ChainState::new();
        chain.append(Item::new(1), roster(&[1])).unwrap();

        let stats = chain.stats();

        assert_eq!(stats.item_count, 1);
        assert!(stats.most_used.is_none());
    }
}
