//! Handlers for `/notes`: private notes of the calling user.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use nuhire_core::error::CoreError;
use nuhire_core::types::DbId;
use nuhire_db::models::note::Note;
use nuhire_db::repositories::NoteRepo;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct NoteRequest {
    #[validate(length(min = 1, max = 10000))]
    pub content: String,
}

/// GET /api/v1/notes
pub async fn list_notes(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Note>>>> {
    let notes = NoteRepo::list_by_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: notes }))
}

/// POST /api/v1/notes
pub async fn create_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<NoteRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Note>>)> {
    input.validate()?;
    let note = NoteRepo::create(&state.pool, auth.user_id, &input.content).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: note })))
}

/// PUT /api/v1/notes/{id}
///
/// Notes of other users are reported as not found.
pub async fn update_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<NoteRequest>,
) -> AppResult<Json<DataResponse<Note>>> {
    input.validate()?;
    let note = NoteRepo::update(&state.pool, id, auth.user_id, &input.content)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Note", id }))?;
    Ok(Json(DataResponse { data: note }))
}

/// DELETE /api/v1/notes/{id}
pub async fn delete_note(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if NoteRepo::delete(&state.pool, id, auth.user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Note", id }))
    }
}
