//! Castchain Core — shared domain abstractions.
//!
//! Every context of the game (chain, catalog, session) builds on the traits
//! defined here. This crate contains no infrastructure code and knows nothing
//! about voice actors or turns.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod repository;
pub mod rng;
