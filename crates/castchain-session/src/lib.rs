//! Castchain — Session context.
//!
//! Pairs two players (or seats one in solo mode), arbitrates turns,
//! validates proposed moves against the chain and the power budgets, and
//! records every accepted transition as an event that both participants
//! fold into the same state.

pub mod application;
pub mod domain;
pub mod error;
