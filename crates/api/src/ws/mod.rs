//! WebSocket layer for realtime group updates.
//!
//! Connection registry with rooms and page presence, the authenticated
//! upgrade handler, and the heartbeat task.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::{ConnectionInfo, GroupPresence, WsManager};
