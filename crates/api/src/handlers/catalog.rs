//! Read access to a class's jobs and candidates.
//!
//! Students see the catalog of the class they are enrolled in; admins see
//! the catalogs of the classes they own.

use axum::extract::{Path, State};
use axum::Json;
use nuhire_core::error::CoreError;
use nuhire_core::types::DbId;
use nuhire_db::models::candidate::Candidate;
use nuhire_db::models::job::Job;
use nuhire_db::repositories::{CandidateRepo, JobRepo};
use nuhire_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::workflow;

/// Check that the caller belongs to (student) or owns (admin) a class.
pub async fn ensure_class_access(pool: &DbPool, caller: &AuthUser, class_id: DbId) -> AppResult<()> {
    if caller.is_admin() {
        workflow::owned_class(pool, caller, class_id).await?;
        return Ok(());
    }
    let user = workflow::load_user(pool, caller.user_id).await?;
    if user.class_id != Some(class_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You are not enrolled in this class".into(),
        )));
    }
    Ok(())
}

/// GET /api/v1/jobs/{id}
pub async fn get_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Job>>> {
    let job = JobRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Job", id }))?;
    ensure_class_access(&state.pool, &auth, job.class_id).await?;
    Ok(Json(DataResponse { data: job }))
}

/// GET /api/v1/candidates/{id}
pub async fn get_candidate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Candidate>>> {
    let candidate = CandidateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Candidate",
            id,
        }))?;
    ensure_class_access(&state.pool, &auth, candidate.class_id).await?;
    Ok(Json(DataResponse { data: candidate }))
}

/// GET /api/v1/classes/{id}/candidates
pub async fn list_class_candidates(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(class_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Candidate>>>> {
    ensure_class_access(&state.pool, &auth, class_id).await?;
    let candidates = CandidateRepo::list_by_class(&state.pool, class_id).await?;
    Ok(Json(DataResponse { data: candidates }))
}
