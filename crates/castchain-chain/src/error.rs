//! Chain errors.

use thiserror::Error;

use crate::cast::ItemId;

/// Rejections raised by [`crate::ChainState`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The item is already somewhere in the chain.
    #[error("item {0} is already in the chain")]
    DuplicateItem(ItemId),
}
