//! Test catalog — in-memory `CatalogGateway` with scripted failures.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use castchain_catalog::{CatalogError, CatalogGateway, ItemDisplay};
use castchain_chain::{CastMember, ItemId};

/// A catalog serving fixed rosters. Unknown items and items marked as
/// failing both report `LookupFailed`.
#[derive(Debug, Default, Clone)]
pub struct StaticCatalog {
    rosters: HashMap<ItemId, Vec<CastMember>>,
    failing: HashSet<ItemId>,
}

impl StaticCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the roster of `item_id`.
    #[must_use]
    pub fn with_roster(mut self, item_id: ItemId, roster: Vec<CastMember>) -> Self {
        self.rosters.insert(item_id, roster);
        self
    }

    /// Makes every lookup of `item_id` fail.
    #[must_use]
    pub fn failing(mut self, item_id: ItemId) -> Self {
        self.failing.insert(item_id);
        self
    }

    fn check(&self, item_id: ItemId) -> Result<(), CatalogError> {
        if self.failing.contains(&item_id) {
            return Err(CatalogError::LookupFailed {
                item_id,
                reason: "connection reset".to_owned(),
            });
        }
        if !self.rosters.contains_key(&item_id) {
            return Err(CatalogError::LookupFailed {
                item_id,
                reason: "unexpected status 404 Not Found".to_owned(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogGateway for StaticCatalog {
    async fn lookup_roster(&self, item_id: ItemId) -> Result<Vec<CastMember>, CatalogError> {
        self.check(item_id)?;
        Ok(self.rosters.get(&item_id).cloned().unwrap_or_default())
    }

    async fn lookup_display(&self, item_id: ItemId) -> Result<ItemDisplay, CatalogError> {
        self.check(item_id)?;
        Ok(ItemDisplay {
            item_id,
            title: Some(format!("Item {item_id}")),
            english_title: None,
            image_url: None,
        })
    }
}
