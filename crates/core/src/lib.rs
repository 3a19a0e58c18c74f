//! Domain rules for the NUHire hiring simulation.
//!
//! This crate has no I/O. The database, event and API layers all reference
//! the same step ordering, quorum rules, offer transitions and socket
//! protocol defined here.

pub mod error;
pub mod event_names;
pub mod offer;
pub mod progress;
pub mod quorum;
pub mod realtime;
pub mod roles;
pub mod types;
pub mod vote;
