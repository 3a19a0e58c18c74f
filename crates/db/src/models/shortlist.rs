//! Group shortlist (checkbox map) model.

use nuhire_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A checked candidate on a group's review page.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShortlistEntry {
    pub id: DbId,
    pub group_id: DbId,
    pub candidate_id: DbId,
    pub checked_by: DbId,
    pub created_at: Timestamp,
}
