pub mod admin;
pub mod auth;
pub mod catalog;
pub mod groups;
pub mod health;
pub mod me;
pub mod notes;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /ws?token=                  WebSocket (token in query)
/// /auth/...                   login, refresh, logout
/// /me/...                     caller profile, route access, own progress
/// /notes/...                  caller's private notes
/// /jobs/{id}, /candidates/{id}, /classes/{id}/candidates
/// /groups/{id}/...            shared group state and group actions
/// /admin/...                  instructor workspace (admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/auth", auth::router())
        .nest("/me", me::router())
        .nest("/notes", notes::router())
        .nest("/groups", groups::router())
        .nest("/admin", admin::router())
        .merge(catalog::router())
}
