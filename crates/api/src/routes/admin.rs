//! Route definitions for the `/admin` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{admin, classes, events, offers, popups};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /users                       -> list_users
/// POST   /users                       -> create_user
/// GET    /users/{id}                  -> get_user
/// PUT    /users/{id}                  -> update_user
/// DELETE /users/{id}                  -> deactivate_user
/// POST   /users/{id}/reset-password   -> reset_password
/// PUT    /users/{id}/progress         -> set_progress
///
/// GET    /classes                     -> list_classes
/// POST   /classes                     -> create_class
/// GET    /classes/{id}                -> get_class
/// DELETE /classes/{id}                -> delete_class
/// GET    /classes/{id}/groups         -> list_groups
/// POST   /classes/{id}/groups         -> create_group
/// GET    /classes/{id}/students       -> list_students
/// GET    /classes/{id}/presence       -> class_presence
/// GET    /classes/{id}/jobs           -> list_jobs
/// POST   /classes/{id}/jobs           -> create_job
/// POST   /classes/{id}/candidates     -> create_candidate
///
/// PUT    /jobs/{id}                   -> update_job
/// DELETE /jobs/{id}                   -> delete_job
/// PUT    /candidates/{id}             -> update_candidate
/// DELETE /candidates/{id}             -> delete_candidate
///
/// PUT    /groups/{id}/job             -> set_group_job
/// POST   /groups/{id}/start           -> start_group
/// PUT    /groups/{id}/members/{user_id} -> assign_member
///
/// GET    /offers?status=              -> list_offers
/// POST   /offers/{id}/decision        -> decide_offer
/// POST   /popups                      -> send_popup
/// GET    /events?limit=&offset=       -> list_events
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route(
            "/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::deactivate_user),
        )
        .route("/users/{id}/reset-password", post(admin::reset_password))
        .route("/users/{id}/progress", put(admin::set_progress))
        .route(
            "/classes",
            get(classes::list_classes).post(classes::create_class),
        )
        .route(
            "/classes/{id}",
            get(classes::get_class).delete(classes::delete_class),
        )
        .route(
            "/classes/{id}/groups",
            get(classes::list_groups).post(classes::create_group),
        )
        .route("/classes/{id}/students", get(classes::list_students))
        .route("/classes/{id}/presence", get(classes::class_presence))
        .route(
            "/classes/{id}/jobs",
            get(classes::list_jobs).post(classes::create_job),
        )
        .route("/classes/{id}/candidates", post(classes::create_candidate))
        .route(
            "/jobs/{id}",
            put(classes::update_job).delete(classes::delete_job),
        )
        .route(
            "/candidates/{id}",
            put(classes::update_candidate).delete(classes::delete_candidate),
        )
        .route("/groups/{id}/job", put(classes::set_group_job))
        .route("/groups/{id}/start", post(classes::start_group))
        .route(
            "/groups/{id}/members/{user_id}",
            put(classes::assign_member),
        )
        .route("/offers", get(offers::list_offers))
        .route("/offers/{id}/decision", post(offers::decide_offer))
        .route("/popups", post(popups::send_popup))
        .route("/events", get(events::list_events))
}
