//! Interview rating model.

use nuhire_core::types::{DbId, Timestamp};
use nuhire_core::vote::InterviewScores;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `interview_ratings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InterviewRating {
    pub id: DbId,
    pub user_id: DbId,
    pub group_id: DbId,
    pub candidate_id: DbId,
    pub overall: i16,
    pub professional_presence: i16,
    pub communication: i16,
    pub personal_quality: i16,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl InterviewRating {
    pub fn scores(&self) -> InterviewScores {
        InterviewScores {
            overall: self.overall,
            professional_presence: self.professional_presence,
            communication: self.communication,
            personal_quality: self.personal_quality,
        }
    }
}

/// DTO for inserting or replacing a rating.
#[derive(Debug, Clone)]
pub struct UpsertRating {
    pub user_id: DbId,
    pub group_id: DbId,
    pub candidate_id: DbId,
    pub scores: InterviewScores,
}
