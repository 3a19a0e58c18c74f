//! Candidate (resume + interview) model.

use nuhire_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `candidates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Candidate {
    pub id: DbId,
    pub class_id: DbId,
    pub name: String,
    pub resume_path: String,
    pub interview_video_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCandidate {
    pub class_id: DbId,
    pub name: String,
    pub resume_path: String,
    pub interview_video_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCandidate {
    pub name: Option<String>,
    pub resume_path: Option<String>,
    pub interview_video_url: Option<String>,
}
