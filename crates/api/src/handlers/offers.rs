//! Handlers for `/admin/offers`: reviewing group offers.

use axum::extract::{Path, Query, State};
use axum::Json;
use nuhire_core::offer::OfferStatus;
use nuhire_core::types::DbId;
use nuhire_db::models::offer::Offer;
use nuhire_db::repositories::OfferRepo;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::workflow;

#[derive(Debug, Deserialize)]
pub struct OfferListQuery {
    pub status: Option<OfferStatus>,
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub status: OfferStatus,
}

/// GET /api/v1/admin/offers?status=
///
/// Offers across every class the caller owns, newest first.
pub async fn list_offers(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<OfferListQuery>,
) -> AppResult<Json<DataResponse<Vec<Offer>>>> {
    let offers = OfferRepo::list_for_admin(&state.pool, admin.user_id, query.status).await?;
    Ok(Json(DataResponse { data: offers }))
}

/// POST /api/v1/admin/offers/{id}/decision
pub async fn decide_offer(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(offer_id): Path<DbId>,
    Json(input): Json<DecisionRequest>,
) -> AppResult<Json<DataResponse<Offer>>> {
    let offer = workflow::decide_offer(&state, &admin, offer_id, input.status).await?;
    Ok(Json(DataResponse { data: offer }))
}
