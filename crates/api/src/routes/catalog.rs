use axum::routing::get;
use axum::Router;

use crate::handlers::catalog;
use crate::state::AppState;

/// Read-only class catalog, mounted at the API root.
///
/// ```text
/// GET /jobs/{id}
/// GET /candidates/{id}
/// GET /classes/{id}/candidates
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/jobs/{id}", get(catalog::get_job))
        .route("/candidates/{id}", get(catalog::get_candidate))
        .route("/classes/{id}/candidates", get(catalog::list_class_candidates))
}
