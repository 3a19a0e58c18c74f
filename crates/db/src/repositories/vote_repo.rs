//! Repository for the `resume_votes` table.

use nuhire_core::types::DbId;
use nuhire_core::vote::VoteChoice;
use sqlx::PgPool;

use crate::models::vote::{ResumeVote, VoteCount};

const COLUMNS: &str = "id, user_id, group_id, candidate_id, vote, created_at, updated_at";

pub struct VoteRepo;

impl VoteRepo {
    /// Record a student's vote, replacing any earlier vote on the same candidate.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        group_id: DbId,
        candidate_id: DbId,
        vote: VoteChoice,
    ) -> Result<ResumeVote, sqlx::Error> {
        let query = format!(
            "INSERT INTO resume_votes (user_id, group_id, candidate_id, vote)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_resume_votes_user_candidate
             DO UPDATE SET vote = EXCLUDED.vote, group_id = EXCLUDED.group_id
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ResumeVote>(&query)
            .bind(user_id)
            .bind(group_id)
            .bind(candidate_id)
            .bind(vote.as_str())
            .fetch_one(pool)
            .await
    }

    pub async fn list_by_group(pool: &PgPool, group_id: DbId) -> Result<Vec<ResumeVote>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM resume_votes WHERE group_id = $1 ORDER BY candidate_id, user_id"
        );
        sqlx::query_as::<_, ResumeVote>(&query)
            .bind(group_id)
            .fetch_all(pool)
            .await
    }

    /// Per-candidate vote counts for a group.
    pub async fn counts_by_group(pool: &PgPool, group_id: DbId) -> Result<Vec<VoteCount>, sqlx::Error> {
        sqlx::query_as::<_, VoteCount>(
            "SELECT candidate_id, vote, COUNT(*) AS count FROM resume_votes
             WHERE group_id = $1
             GROUP BY candidate_id, vote
             ORDER BY candidate_id, vote",
        )
        .bind(group_id)
        .fetch_all(pool)
        .await
    }

    /// Vote counts for one candidate within a group.
    pub async fn counts_for_candidate(
        pool: &PgPool,
        group_id: DbId,
        candidate_id: DbId,
    ) -> Result<Vec<VoteCount>, sqlx::Error> {
        sqlx::query_as::<_, VoteCount>(
            "SELECT candidate_id, vote, COUNT(*) AS count FROM resume_votes
             WHERE group_id = $1 AND candidate_id = $2
             GROUP BY candidate_id, vote",
        )
        .bind(group_id)
        .bind(candidate_id)
        .fetch_all(pool)
        .await
    }
}
