//! Route modules, one per resource.

pub mod catalog;
pub mod health;
pub mod sessions;
