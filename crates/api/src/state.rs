use std::sync::Arc;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state, available to handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind an `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub pool: nuhire_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Live browser connections.
    pub ws_manager: Arc<WsManager>,
    /// Platform event bus; the realtime router and event log subscribe to it.
    pub event_bus: Arc<nuhire_events::EventBus>,
}
