//! Handler for `/admin/popups`: instructor messages pushed to students.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use nuhire_core::error::CoreError;
use nuhire_core::event_names::{self, entities};
use nuhire_core::types::DbId;
use nuhire_db::repositories::GroupRepo;
use nuhire_events::PlatformEvent;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;
use crate::workflow;

#[derive(Debug, Deserialize, Validate)]
pub struct PopupRequest {
    pub class_id: DbId,
    /// Target groups. Empty sends to every student in the class.
    #[serde(default)]
    pub group_ids: Vec<DbId>,
    #[validate(length(min = 1, max = 200))]
    pub headline: String,
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
}

/// POST /api/v1/admin/popups
///
/// Delivery is best-effort to whoever is connected. Returns 202 Accepted.
pub async fn send_popup(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<PopupRequest>,
) -> AppResult<StatusCode> {
    input.validate()?;
    workflow::owned_class(&state.pool, &admin, input.class_id).await?;

    if !input.group_ids.is_empty() {
        let groups = GroupRepo::list_by_class(&state.pool, input.class_id).await?;
        if let Some(stray) = input
            .group_ids
            .iter()
            .find(|id| !groups.iter().any(|g| g.id == **id))
        {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Group {stray} does not belong to class {}",
                input.class_id
            ))));
        }
    }

    tracing::info!(
        admin_id = admin.user_id,
        class_id = input.class_id,
        groups = input.group_ids.len(),
        "Popup sent"
    );
    state.event_bus.publish(
        PlatformEvent::new(event_names::POPUP_SENT)
            .with_source(entities::CLASS, input.class_id)
            .with_actor(admin.user_id)
            .with_field("class_id", input.class_id)
            .with_field("group_ids", &input.group_ids)
            .with_field("headline", &input.headline)
            .with_field("message", &input.message),
    );

    Ok(StatusCode::ACCEPTED)
}
