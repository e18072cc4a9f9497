//! Castchain Event Store — append-only session event logs.
//!
//! Sessions live only as long as the process. Each session owns one
//! stream; appends are checked against the writer's expected version so
//! that two racing commands on the same session cannot both commit.

pub mod memory_event_repository;

pub use memory_event_repository::InMemoryEventRepository;
