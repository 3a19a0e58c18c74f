//! Student group model.

use nuhire_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `groups` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Group {
    pub id: DbId,
    pub class_id: DbId,
    pub group_number: i32,
    pub job_id: Option<DbId>,
    /// Set once the instructor starts the simulation for this group.
    pub started: bool,
    pub started_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroup {
    pub class_id: DbId,
    pub group_number: i32,
    pub job_id: Option<DbId>,
}

/// A group member as shown on group pages and in snapshots.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GroupMember {
    pub id: DbId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub progress: String,
}
