//! Catalog gateway port.

use async_trait::async_trait;
use castchain_chain::{CastMember, ItemId};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Cosmetic details of an item. Not needed for matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDisplay {
    pub item_id: ItemId,
    pub title: Option<String>,
    pub english_title: Option<String>,
    pub image_url: Option<String>,
}

/// Read access to the external catalog of items and their casts.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Fetches the normalized cast roster of an item.
    async fn lookup_roster(&self, item_id: ItemId) -> Result<Vec<CastMember>, CatalogError>;

    /// Fetches title and artwork of an item.
    async fn lookup_display(&self, item_id: ItemId) -> Result<ItemDisplay, CatalogError>;
}
