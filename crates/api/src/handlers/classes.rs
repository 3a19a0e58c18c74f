//! Handlers for the admin class workspace: classes, groups, rosters, jobs,
//! candidates and live presence.
//!
//! Every handler requires the `admin` role and ownership of the class.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use nuhire_core::error::CoreError;
use nuhire_core::roles::{ROLE_STUDENT, ROLE_STUDENT_ID};
use nuhire_core::types::DbId;
use nuhire_db::models::candidate::{Candidate, CreateCandidate, UpdateCandidate};
use nuhire_db::models::class::{Class, CreateClass};
use nuhire_db::models::group::{CreateGroup, Group};
use nuhire_db::models::job::{CreateJob, Job, UpdateJob};
use nuhire_db::models::user::UserResponse;
use nuhire_db::repositories::{CandidateRepo, ClassRepo, GroupRepo, JobRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::workflow;
use crate::ws::GroupPresence;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClassRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ClassDetail {
    pub class: Class,
    pub groups: Vec<Group>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[validate(range(min = 1))]
    pub group_number: i32,
    pub job_id: Option<DbId>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct JobRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub file_path: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateJobRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub file_path: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CandidateRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1))]
    pub resume_path: String,
    #[validate(url)]
    pub interview_video_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCandidateRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub resume_path: Option<String>,
    #[validate(url)]
    pub interview_video_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetGroupJobRequest {
    pub job_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Classes
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/classes
pub async fn list_classes(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Class>>>> {
    let classes = ClassRepo::list_by_admin(&state.pool, admin.user_id).await?;
    Ok(Json(DataResponse { data: classes }))
}

/// POST /api/v1/admin/classes
///
/// The creating admin's open sockets start receiving the class's events.
pub async fn create_class(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateClassRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Class>>)> {
    input.validate()?;
    let class = ClassRepo::create(
        &state.pool,
        &CreateClass {
            name: input.name,
            admin_id: admin.user_id,
        },
    )
    .await?;
    state.ws_manager.watch_class(admin.user_id, class.id).await;
    tracing::info!(admin_id = admin.user_id, class_id = class.id, "Class created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: class })))
}

/// GET /api/v1/admin/classes/{id}
pub async fn get_class(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(class_id): Path<DbId>,
) -> AppResult<Json<DataResponse<ClassDetail>>> {
    let class = workflow::owned_class(&state.pool, &admin, class_id).await?;
    let groups = GroupRepo::list_by_class(&state.pool, class_id).await?;
    Ok(Json(DataResponse {
        data: ClassDetail { class, groups },
    }))
}

/// DELETE /api/v1/admin/classes/{id}
pub async fn delete_class(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(class_id): Path<DbId>,
) -> AppResult<StatusCode> {
    workflow::owned_class(&state.pool, &admin, class_id).await?;
    ClassRepo::delete(&state.pool, class_id).await?;
    tracing::info!(admin_id = admin.user_id, class_id, "Class deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/classes/{id}/students
pub async fn list_students(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(class_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    workflow::owned_class(&state.pool, &admin, class_id).await?;
    let students = UserRepo::list_students_by_class(&state.pool, class_id)
        .await?
        .iter()
        .map(|u| UserResponse::from_user(u, ROLE_STUDENT.to_string()))
        .collect();
    Ok(Json(DataResponse { data: students }))
}

/// GET /api/v1/admin/classes/{id}/presence
///
/// Which connected students are on which page, grouped by group.
pub async fn class_presence(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(class_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<GroupPresence>>>> {
    workflow::owned_class(&state.pool, &admin, class_id).await?;
    let presence = state.ws_manager.presence_for_class(class_id).await;
    Ok(Json(DataResponse { data: presence }))
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/classes/{id}/groups
pub async fn list_groups(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(class_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Group>>>> {
    workflow::owned_class(&state.pool, &admin, class_id).await?;
    let groups = GroupRepo::list_by_class(&state.pool, class_id).await?;
    Ok(Json(DataResponse { data: groups }))
}

/// POST /api/v1/admin/classes/{id}/groups
pub async fn create_group(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(class_id): Path<DbId>,
    Json(input): Json<CreateGroupRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Group>>)> {
    input.validate()?;
    workflow::owned_class(&state.pool, &admin, class_id).await?;
    if let Some(job_id) = input.job_id {
        class_job(&state, class_id, job_id).await?;
    }

    let group = GroupRepo::create(
        &state.pool,
        &CreateGroup {
            class_id,
            group_number: input.group_number,
            job_id: input.job_id,
        },
    )
    .await?;
    tracing::info!(admin_id = admin.user_id, class_id, group_id = group.id, "Group created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: group })))
}

/// PUT /api/v1/admin/groups/{id}/job
pub async fn set_group_job(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(group_id): Path<DbId>,
    Json(input): Json<SetGroupJobRequest>,
) -> AppResult<Json<DataResponse<Group>>> {
    let group = workflow::find_group(&state.pool, group_id).await?;
    workflow::owned_class(&state.pool, &admin, group.class_id).await?;
    if let Some(job_id) = input.job_id {
        class_job(&state, group.class_id, job_id).await?;
    }

    let group = GroupRepo::set_job(&state.pool, group_id, input.job_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Group",
            id: group_id,
        }))?;
    tracing::info!(admin_id = admin.user_id, group_id, job_id = ?input.job_id, "Group job set");
    Ok(Json(DataResponse { data: group }))
}

/// POST /api/v1/admin/groups/{id}/start
pub async fn start_group(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(group_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Group>>> {
    let group = workflow::start_group(&state, &admin, group_id).await?;
    Ok(Json(DataResponse { data: group }))
}

/// PUT /api/v1/admin/groups/{id}/members/{user_id}
///
/// Place a student in a group. Their open sockets move to the new group room,
/// and the group they left has its pending confirmations settled.
pub async fn assign_member(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path((group_id, user_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let group = workflow::find_group(&state.pool, group_id).await?;
    workflow::owned_class(&state.pool, &admin, group.class_id).await?;

    let student = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;
    if student.role_id != ROLE_STUDENT_ID {
        return Err(AppError::Core(CoreError::Validation(
            "Only students can be placed in a group".into(),
        )));
    }
    if let Some(class_id) = student.class_id {
        workflow::owned_class(&state.pool, &admin, class_id).await?;
    }

    let user = UserRepo::assign_group(&state.pool, user_id, group.class_id, Some(group_id))
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;
    let moved = state
        .ws_manager
        .reassign(user_id, group.class_id, Some(group_id))
        .await;
    tracing::info!(
        admin_id = admin.user_id,
        group_id,
        user_id,
        live_connections = moved,
        "Student assigned to group"
    );
    if let Some(previous) = student.group_id.filter(|&g| g != group_id) {
        workflow::settle_group(&state, admin.user_id, previous).await?;
    }

    Ok(Json(DataResponse {
        data: UserResponse::from_user(&user, ROLE_STUDENT.to_string()),
    }))
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/classes/{id}/jobs
pub async fn list_jobs(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(class_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Job>>>> {
    workflow::owned_class(&state.pool, &admin, class_id).await?;
    let jobs = JobRepo::list_by_class(&state.pool, class_id).await?;
    Ok(Json(DataResponse { data: jobs }))
}

/// POST /api/v1/admin/classes/{id}/jobs
pub async fn create_job(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(class_id): Path<DbId>,
    Json(input): Json<JobRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Job>>)> {
    input.validate()?;
    workflow::owned_class(&state.pool, &admin, class_id).await?;
    let job = JobRepo::create(
        &state.pool,
        &CreateJob {
            class_id,
            title: input.title,
            description: input.description,
            file_path: input.file_path,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: job })))
}

/// PUT /api/v1/admin/jobs/{id}
pub async fn update_job(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateJobRequest>,
) -> AppResult<Json<DataResponse<Job>>> {
    input.validate()?;
    owned_job(&state, &admin, id).await?;
    let job = JobRepo::update(
        &state.pool,
        id,
        &UpdateJob {
            title: input.title,
            description: input.description,
            file_path: input.file_path,
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound { entity: "Job", id }))?;
    Ok(Json(DataResponse { data: job }))
}

/// DELETE /api/v1/admin/jobs/{id}
pub async fn delete_job(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    owned_job(&state, &admin, id).await?;
    JobRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/classes/{id}/candidates
pub async fn create_candidate(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(class_id): Path<DbId>,
    Json(input): Json<CandidateRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Candidate>>)> {
    input.validate()?;
    workflow::owned_class(&state.pool, &admin, class_id).await?;
    let candidate = CandidateRepo::create(
        &state.pool,
        &CreateCandidate {
            class_id,
            name: input.name,
            resume_path: input.resume_path,
            interview_video_url: input.interview_video_url,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: candidate })))
}

/// PUT /api/v1/admin/candidates/{id}
pub async fn update_candidate(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCandidateRequest>,
) -> AppResult<Json<DataResponse<Candidate>>> {
    input.validate()?;
    owned_candidate(&state, &admin, id).await?;
    let candidate = CandidateRepo::update(
        &state.pool,
        id,
        &UpdateCandidate {
            name: input.name,
            resume_path: input.resume_path,
            interview_video_url: input.interview_video_url,
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Candidate",
        id,
    }))?;
    Ok(Json(DataResponse { data: candidate }))
}

/// DELETE /api/v1/admin/candidates/{id}
pub async fn delete_candidate(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    owned_candidate(&state, &admin, id).await?;
    CandidateRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The job must exist and belong to `class_id`.
async fn class_job(state: &AppState, class_id: DbId, job_id: DbId) -> AppResult<Job> {
    JobRepo::find_by_id(&state.pool, job_id)
        .await?
        .filter(|j| j.class_id == class_id)
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Job {job_id} does not belong to class {class_id}"
            )))
        })
}

async fn owned_job(
    state: &AppState,
    admin: &AuthUser,
    id: DbId,
) -> AppResult<Job> {
    let job = JobRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Job", id }))?;
    workflow::owned_class(&state.pool, admin, job.class_id).await?;
    Ok(job)
}

async fn owned_candidate(
    state: &AppState,
    admin: &AuthUser,
    id: DbId,
) -> AppResult<Candidate> {
    let candidate = CandidateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Candidate",
            id,
        }))?;
    workflow::owned_class(&state.pool, admin, candidate.class_id).await?;
    Ok(candidate)
}
