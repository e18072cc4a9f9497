//! Domain model of a game session.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod participants;
pub mod power;
pub mod settings;
pub mod timer;
