//! Handlers for `/groups/{id}`: the shared state of one student group.
//!
//! Reads are open to members and admins. Writes go through
//! [`crate::workflow`], which enforces membership, progress and locking.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::Json;
use nuhire_core::quorum::{GroupAction, QuorumStatus};
use nuhire_core::types::DbId;
use nuhire_core::vote::{InterviewScores, RatingSummary, VoteChoice};
use nuhire_db::models::group::{Group, GroupMember};
use nuhire_db::models::offer::Offer;
use nuhire_db::models::rating::InterviewRating;
use nuhire_db::models::shortlist::ShortlistEntry;
use nuhire_db::repositories::{OfferRepo, RatingRepo, ShortlistRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStudent;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::workflow::{
    self, CandidateVotes, ConfirmOutcome, ConfirmRequest, GroupSnapshot, ShortlistState,
};

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct GroupDetail {
    pub group: Group,
    pub members: Vec<GroupMember>,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub vote: VoteChoice,
}

#[derive(Debug, Deserialize)]
pub struct ShortlistRequest {
    pub checked: bool,
}

#[derive(Debug, Serialize)]
pub struct GroupRatings {
    pub ratings: Vec<InterviewRating>,
    pub summaries: Vec<RatingSummary>,
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/groups/{id}
pub async fn get_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<DbId>,
) -> AppResult<Json<DataResponse<GroupDetail>>> {
    let group = workflow::readable_group(&state.pool, &auth, group_id).await?;
    let members = UserRepo::list_group_members(&state.pool, group_id).await?;
    Ok(Json(DataResponse {
        data: GroupDetail { group, members },
    }))
}

/// GET /api/v1/groups/{id}/state
///
/// Full snapshot for reconciling after a reconnect.
pub async fn get_state(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<DbId>,
) -> AppResult<Json<DataResponse<GroupSnapshot>>> {
    workflow::readable_group(&state.pool, &auth, group_id).await?;
    let snapshot = workflow::group_snapshot(&state.pool, group_id).await?;
    Ok(Json(DataResponse { data: snapshot }))
}

/// GET /api/v1/groups/{id}/votes
pub async fn list_votes(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<CandidateVotes>>>> {
    workflow::readable_group(&state.pool, &auth, group_id).await?;
    let votes = workflow::group_votes(&state.pool, group_id).await?;
    Ok(Json(DataResponse { data: votes }))
}

/// GET /api/v1/groups/{id}/shortlist
pub async fn get_shortlist(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ShortlistEntry>>>> {
    workflow::readable_group(&state.pool, &auth, group_id).await?;
    let entries = ShortlistRepo::list_by_group(&state.pool, group_id).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// GET /api/v1/groups/{id}/confirmations/{action}
pub async fn get_confirmation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((group_id, action)): Path<(DbId, GroupAction)>,
) -> AppResult<Json<DataResponse<QuorumStatus>>> {
    workflow::readable_group(&state.pool, &auth, group_id).await?;
    let status = workflow::confirmation_status(&state.pool, group_id, action).await?;
    Ok(Json(DataResponse { data: status }))
}

/// GET /api/v1/groups/{id}/ratings
///
/// Every member's ratings plus per-candidate averages.
pub async fn list_ratings(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<DbId>,
) -> AppResult<Json<DataResponse<GroupRatings>>> {
    workflow::readable_group(&state.pool, &auth, group_id).await?;
    let ratings = RatingRepo::list_by_group(&state.pool, group_id).await?;

    let mut by_candidate: BTreeMap<DbId, Vec<InterviewScores>> = BTreeMap::new();
    for rating in &ratings {
        by_candidate
            .entry(rating.candidate_id)
            .or_default()
            .push(rating.scores());
    }
    let summaries = by_candidate
        .iter()
        .filter_map(|(candidate_id, scores)| RatingSummary::from_scores(*candidate_id, scores))
        .collect();

    Ok(Json(DataResponse {
        data: GroupRatings { ratings, summaries },
    }))
}

/// GET /api/v1/groups/{id}/offers
pub async fn list_offers(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Offer>>>> {
    workflow::readable_group(&state.pool, &auth, group_id).await?;
    let offers = OfferRepo::list_by_group(&state.pool, group_id).await?;
    Ok(Json(DataResponse { data: offers }))
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// PUT /api/v1/groups/{id}/votes/{candidate_id}
pub async fn cast_vote(
    State(state): State<AppState>,
    RequireStudent(student): RequireStudent,
    Path((group_id, candidate_id)): Path<(DbId, DbId)>,
    Json(input): Json<VoteRequest>,
) -> AppResult<Json<DataResponse<CandidateVotes>>> {
    let votes = workflow::cast_vote(&state, &student, group_id, candidate_id, input.vote).await?;
    Ok(Json(DataResponse { data: votes }))
}

/// PUT /api/v1/groups/{id}/shortlist/{candidate_id}
pub async fn toggle_shortlist(
    State(state): State<AppState>,
    RequireStudent(student): RequireStudent,
    Path((group_id, candidate_id)): Path<(DbId, DbId)>,
    Json(input): Json<ShortlistRequest>,
) -> AppResult<Json<DataResponse<ShortlistState>>> {
    let shortlist =
        workflow::toggle_shortlist(&state, &student, group_id, candidate_id, input.checked)
            .await?;
    Ok(Json(DataResponse { data: shortlist }))
}

/// POST /api/v1/groups/{id}/confirmations
pub async fn confirm(
    State(state): State<AppState>,
    RequireStudent(student): RequireStudent,
    Path(group_id): Path<DbId>,
    Json(input): Json<ConfirmRequest>,
) -> AppResult<Json<DataResponse<ConfirmOutcome>>> {
    let outcome = workflow::confirm(&state, &student, group_id, &input).await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// DELETE /api/v1/groups/{id}/confirmations/{action}
pub async fn withdraw_confirmation(
    State(state): State<AppState>,
    RequireStudent(student): RequireStudent,
    Path((group_id, action)): Path<(DbId, GroupAction)>,
) -> AppResult<Json<DataResponse<QuorumStatus>>> {
    let status = workflow::withdraw(&state, &student, group_id, action).await?;
    Ok(Json(DataResponse { data: status }))
}

/// PUT /api/v1/groups/{id}/ratings/{candidate_id}
pub async fn rate_candidate(
    State(state): State<AppState>,
    RequireStudent(student): RequireStudent,
    Path((group_id, candidate_id)): Path<(DbId, DbId)>,
    Json(scores): Json<InterviewScores>,
) -> AppResult<Json<DataResponse<InterviewRating>>> {
    let rating =
        workflow::rate_candidate(&state, &student, group_id, candidate_id, scores).await?;
    Ok(Json(DataResponse { data: rating }))
}
