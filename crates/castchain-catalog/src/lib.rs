//! Castchain — catalog gateway.
//!
//! The game core never sees raw catalog payloads. Adapters in this crate
//! fetch titles and cast lists and normalize them into strict
//! [`castchain_chain::CastMember`] rows at the boundary.

pub mod error;
pub mod gateway;
pub mod jikan;

pub use error::CatalogError;
pub use gateway::{CatalogGateway, ItemDisplay};
pub use jikan::JikanCatalog;
