//! Route definitions for the `/groups` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::groups;
use crate::state::AppState;

/// Routes mounted at `/groups`.
///
/// ```text
/// GET    /{id}                               -> get_group
/// GET    /{id}/state                         -> get_state
/// GET    /{id}/votes                         -> list_votes
/// PUT    /{id}/votes/{candidate_id}          -> cast_vote
/// GET    /{id}/shortlist                     -> get_shortlist
/// PUT    /{id}/shortlist/{candidate_id}      -> toggle_shortlist
/// POST   /{id}/confirmations                 -> confirm
/// GET    /{id}/confirmations/{action}        -> get_confirmation
/// DELETE /{id}/confirmations/{action}        -> withdraw_confirmation
/// GET    /{id}/ratings                       -> list_ratings
/// PUT    /{id}/ratings/{candidate_id}        -> rate_candidate
/// GET    /{id}/offers                        -> list_offers
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(groups::get_group))
        .route("/{id}/state", get(groups::get_state))
        .route("/{id}/votes", get(groups::list_votes))
        .route("/{id}/votes/{candidate_id}", put(groups::cast_vote))
        .route("/{id}/shortlist", get(groups::get_shortlist))
        .route("/{id}/shortlist/{candidate_id}", put(groups::toggle_shortlist))
        .route("/{id}/confirmations", post(groups::confirm))
        .route(
            "/{id}/confirmations/{action}",
            get(groups::get_confirmation).delete(groups::withdraw_confirmation),
        )
        .route("/{id}/ratings", get(groups::list_ratings))
        .route("/{id}/ratings/{candidate_id}", put(groups::rate_candidate))
        .route("/{id}/offers", get(groups::list_offers))
}
