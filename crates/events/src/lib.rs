//! NUHire event bus.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`] -- the domain event envelope published by the
//!   group workflow and admin actions.
//! - [`EventPersistence`] -- background service that appends every event to
//!   the `events` table.
//!
//! Realtime fan-out to WebSocket clients lives in the API crate, which
//! subscribes to the same bus.

pub mod bus;
pub mod persistence;

pub use bus::{EventBus, PlatformEvent};
pub use persistence::EventPersistence;
