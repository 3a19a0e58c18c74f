//! Group confirmation model.

use nuhire_core::quorum::Confirmation;
use nuhire_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `group_confirmations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GroupConfirmation {
    pub id: DbId,
    pub group_id: DbId,
    pub action: String,
    pub user_id: DbId,
    pub subject: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&GroupConfirmation> for Confirmation {
    fn from(row: &GroupConfirmation) -> Self {
        Confirmation {
            user_id: row.user_id,
            subject: row.subject.clone(),
        }
    }
}
