//! Handler for `/admin/events`: the persisted platform event log.

use axum::extract::{Query, State};
use axum::Json;
use nuhire_db::models::event::EventRow;
use nuhire_db::repositories::EventRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/events?limit=&offset=
pub async fn list_events(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<EventRow>>>> {
    let events = EventRepo::list(&state.pool, params.limit(), params.offset()).await?;
    Ok(Json(DataResponse { data: events }))
}
