//! Handlers for `/me`: the caller's profile, route access and own progress.

use axum::extract::{Query, State};
use axum::Json;
use nuhire_core::error::CoreError;
use nuhire_core::progress::{self, ProgressStep};
use nuhire_db::models::job::Job;
use nuhire_db::models::user::UserResponse;
use nuhire_db::repositories::{GroupRepo, JobRepo, RoleRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStudent;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::workflow;

#[derive(Debug, Serialize)]
pub struct UnlockedRoute {
    pub step: ProgressStep,
    pub route: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserResponse,
    pub progress: ProgressStep,
    pub unlocked: Vec<UnlockedRoute>,
}

#[derive(Debug, Deserialize)]
pub struct AccessQuery {
    pub route: String,
}

#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub allowed: bool,
    /// Step that gates the route, `None` for ungated routes.
    pub required_step: Option<ProgressStep>,
}

/// GET /api/v1/me
pub async fn get_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<MeResponse>>> {
    let user = workflow::load_user(&state.pool, auth.user_id).await?;
    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    let progress = user.progress_step()?;

    let unlocked = progress::unlocked_steps(progress)
        .into_iter()
        .map(|step| UnlockedRoute {
            step,
            route: step.route(),
        })
        .collect();

    Ok(Json(DataResponse {
        data: MeResponse {
            user: UserResponse::from_user(&user, role),
            progress,
            unlocked,
        },
    }))
}

/// GET /api/v1/me/access?route=
///
/// Whether the caller may open a client route. Admins may open every route.
pub async fn check_access(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AccessQuery>,
) -> AppResult<Json<DataResponse<AccessResponse>>> {
    let required_step = progress::step_for_route(&query.route);
    let allowed = if auth.is_admin() {
        true
    } else {
        let user = workflow::load_user(&state.pool, auth.user_id).await?;
        progress::can_access_route(user.progress_step()?, &query.route)
    };

    Ok(Json(DataResponse {
        data: AccessResponse {
            allowed,
            required_step,
        },
    }))
}

/// POST /api/v1/me/progress/advance
pub async fn advance(
    State(state): State<AppState>,
    RequireStudent(student): RequireStudent,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = workflow::advance_individual(&state, &student).await?;
    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from_user(&user, role),
    }))
}

/// GET /api/v1/me/job
///
/// The job description assigned to the caller's group.
pub async fn my_job(
    State(state): State<AppState>,
    RequireStudent(student): RequireStudent,
) -> AppResult<Json<DataResponse<Job>>> {
    let user = workflow::load_user(&state.pool, student.user_id).await?;
    let group_id = user.group_id.ok_or_else(|| {
        AppError::Core(CoreError::Forbidden("You are not assigned to a group".into()))
    })?;
    let group = GroupRepo::find_by_id(&state.pool, group_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Group",
            id: group_id,
        }))?;
    let job_id = group.job_id.ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "No job has been assigned to your group yet".into(),
        ))
    })?;
    let job = JobRepo::find_by_id(&state.pool, job_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Job",
            id: job_id,
        }))?;

    Ok(Json(DataResponse { data: job }))
}
