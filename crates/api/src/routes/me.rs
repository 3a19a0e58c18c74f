use axum::routing::{get, post};
use axum::Router;

use crate::handlers::me;
use crate::state::AppState;

/// Routes mounted at `/me`.
///
/// ```text
/// GET  /                  -> get_me
/// GET  /access?route=     -> check_access
/// POST /progress/advance  -> advance (student)
/// GET  /job               -> my_job (student)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(me::get_me))
        .route("/access", get(me::check_access))
        .route("/progress/advance", post(me::advance))
        .route("/job", get(me::my_job))
}
