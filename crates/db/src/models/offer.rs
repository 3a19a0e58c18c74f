//! Offer model.

use nuhire_core::error::CoreError;
use nuhire_core::offer::OfferStatus;
use nuhire_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `offers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Offer {
    pub id: DbId,
    pub group_id: DbId,
    pub class_id: DbId,
    pub candidate_id: DbId,
    pub status: String,
    pub submitted_by: Option<DbId>,
    pub decided_by: Option<DbId>,
    pub decided_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Offer {
    pub fn status(&self) -> Result<OfferStatus, CoreError> {
        self.status.parse()
    }
}

#[derive(Debug, Clone)]
pub struct CreateOffer {
    pub group_id: DbId,
    pub class_id: DbId,
    pub candidate_id: DbId,
    pub submitted_by: DbId,
}
