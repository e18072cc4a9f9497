//! Catalog errors.

use castchain_chain::ItemId;
use thiserror::Error;

/// Upstream failure while talking to the catalog. Recoverable by retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Network, status or payload failure for one lookup.
    #[error("catalog lookup failed for item {item_id}: {reason}")]
    LookupFailed {
        /// The item being looked up.
        item_id: ItemId,
        /// What went wrong.
        reason: String,
    },
}

impl CatalogError {
    pub(crate) fn lookup_failed(item_id: ItemId, reason: impl ToString) -> Self {
        Self::LookupFailed {
            item_id,
            reason: reason.to_string(),
        }
    }
}
