//! Resume vote models.

use nuhire_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `resume_votes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ResumeVote {
    pub id: DbId,
    pub user_id: DbId,
    pub group_id: DbId,
    pub candidate_id: DbId,
    pub vote: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Aggregated vote count for one (candidate, vote) pair within a group.
#[derive(Debug, Clone, FromRow)]
pub struct VoteCount {
    pub candidate_id: DbId,
    pub vote: String,
    pub count: i64,
}
