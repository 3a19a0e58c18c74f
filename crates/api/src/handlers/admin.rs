//! Handlers for `/admin/users` (account management).
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use nuhire_core::error::CoreError;
use nuhire_core::progress::ProgressStep;
use nuhire_core::types::DbId;
use nuhire_db::models::user::{CreateUser, UpdateUser, User, UserResponse};
use nuhire_db::repositories::{RefreshSessionRepo, RoleRepo, UserRepo};
use serde::Deserialize;
use validator::Validate;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::workflow;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    pub password: String,
    pub role_id: DbId,
    pub class_id: Option<DbId>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    pub role_id: Option<DbId>,
    pub class_id: Option<DbId>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct SetProgressRequest {
    pub progress: ProgressStep,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    input.validate()?;
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    ensure_role_exists(&state, input.role_id).await?;
    if let Some(class_id) = input.class_id {
        workflow::owned_class(&state.pool, &admin, class_id).await?;
    }

    let hashed = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email: input.email.trim().to_lowercase(),
            first_name: input.first_name,
            last_name: input.last_name,
            password_hash: hashed,
            role_id: input.role_id,
            class_id: input.class_id,
        },
    )
    .await?;
    tracing::info!(admin_id = admin.user_id, user_id = user.id, "User created");

    let response = user_to_response(&state, &user).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool).await?;

    // One roles query instead of one per user.
    let roles = RoleRepo::list(&state.pool).await?;

    let responses = users
        .iter()
        .map(|u| {
            let role_name = roles
                .iter()
                .find(|r| r.id == u.role_id)
                .map(|r| r.name.clone())
                .unwrap_or_else(|| "unknown".to_string());
            UserResponse::from_user(u, role_name)
        })
        .collect();

    Ok(Json(DataResponse { data: responses }))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = find_user(&state, id).await?;

    let response = user_to_response(&state, &user).await?;
    Ok(Json(DataResponse { data: response }))
}

/// PUT /api/v1/admin/users/{id}
///
/// Profile fields only; passwords go through reset-password. Changing a
/// grouped student's role or deactivating them removes them from the
/// group's quorum, so pending confirmations are settled afterwards.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    input.validate()?;
    let existing = managed_user(&state, &admin, id).await?;
    if let Some(role_id) = input.role_id {
        ensure_role_exists(&state, role_id).await?;
    }
    if let Some(class_id) = input.class_id {
        workflow::owned_class(&state.pool, &admin, class_id).await?;
    }

    let update = UpdateUser {
        email: input.email.map(|e| e.trim().to_lowercase()),
        first_name: input.first_name,
        last_name: input.last_name,
        role_id: input.role_id,
        class_id: input.class_id,
        is_active: input.is_active,
    };

    let user = UserRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    if existing.is_active && !user.is_active {
        RefreshSessionRepo::revoke_for_user(&state.pool, id).await?;
    }
    if let Some(group_id) = existing.group_id {
        if user.group_id.is_none() {
            if let Some(class_id) = user.class_id {
                state.ws_manager.reassign(id, class_id, None).await;
            }
        }
        if user.group_id.is_none() || !user.is_active {
            workflow::settle_group(&state, admin.user_id, group_id).await?;
        }
    }

    let response = user_to_response(&state, &user).await?;
    Ok(Json(DataResponse { data: response }))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Soft-deactivate. The account's refresh tokens are spent, and a
/// deactivated student stops counting toward group quorum.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let user = managed_user(&state, &admin, id).await?;
    if !UserRepo::deactivate(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }
    let revoked = RefreshSessionRepo::revoke_for_user(&state.pool, id).await?;
    tracing::info!(admin_id = admin.user_id, user_id = id, revoked, "User deactivated");
    if let Some(group_id) = user.group_id {
        workflow::settle_group(&state, admin.user_id, group_id).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/users/{id}/reset-password
///
/// Existing refresh tokens stop working; the user logs in again.
pub async fn reset_password(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    managed_user(&state, &admin, id).await?;
    validate_password_strength(&input.new_password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let hashed = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    if !UserRepo::update_password(&state.pool, id, &hashed).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }
    let revoked = RefreshSessionRepo::revoke_for_user(&state.pool, id).await?;
    tracing::info!(admin_id = admin.user_id, user_id = id, revoked, "Password reset");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/admin/users/{id}/progress
///
/// Override a student's progress. This is the only way to move backwards.
pub async fn set_progress(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<SetProgressRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    managed_user(&state, &admin, id).await?;
    let user = UserRepo::set_progress(&state.pool, id, input.progress)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    tracing::info!(
        admin_id = admin.user_id,
        user_id = id,
        progress = %input.progress,
        "Progress overridden"
    );

    let response = user_to_response(&state, &user).await?;
    Ok(Json(DataResponse { data: response }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
}

/// Load a user the caller may change: one enrolled in a class the caller
/// owns, or one not enrolled anywhere yet.
async fn managed_user(state: &AppState, admin: &AuthUser, id: DbId) -> AppResult<User> {
    let user = find_user(state, id).await?;
    if let Some(class_id) = user.class_id {
        workflow::owned_class(&state.pool, admin, class_id).await?;
    }
    Ok(user)
}

async fn user_to_response(state: &AppState, user: &User) -> AppResult<UserResponse> {
    let role_name = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    Ok(UserResponse::from_user(user, role_name))
}

async fn ensure_role_exists(state: &AppState, role_id: DbId) -> AppResult<()> {
    RoleRepo::find_by_id(&state.pool, role_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::Core(CoreError::Validation(format!("Unknown role id {role_id}"))))
}
