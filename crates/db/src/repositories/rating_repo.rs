//! Repository for the `interview_ratings` table.

use nuhire_core::types::DbId;
use sqlx::PgPool;

use crate::models::rating::{InterviewRating, UpsertRating};

const COLUMNS: &str = "id, user_id, group_id, candidate_id, overall, professional_presence, \
                        communication, personal_quality, created_at, updated_at";

pub struct RatingRepo;

impl RatingRepo {
    /// Insert a rating or replace the caller's earlier rating of the same candidate.
    pub async fn upsert(pool: &PgPool, input: &UpsertRating) -> Result<InterviewRating, sqlx::Error> {
        let query = format!(
            "INSERT INTO interview_ratings
                (user_id, group_id, candidate_id, overall, professional_presence,
                 communication, personal_quality)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT ON CONSTRAINT uq_interview_ratings_user_candidate
             DO UPDATE SET
                group_id = EXCLUDED.group_id,
                overall = EXCLUDED.overall,
                professional_presence = EXCLUDED.professional_presence,
                communication = EXCLUDED.communication,
                personal_quality = EXCLUDED.personal_quality
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, InterviewRating>(&query)
            .bind(input.user_id)
            .bind(input.group_id)
            .bind(input.candidate_id)
            .bind(input.scores.overall)
            .bind(input.scores.professional_presence)
            .bind(input.scores.communication)
            .bind(input.scores.personal_quality)
            .fetch_one(pool)
            .await
    }

    pub async fn list_by_group(
        pool: &PgPool,
        group_id: DbId,
    ) -> Result<Vec<InterviewRating>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM interview_ratings
             WHERE group_id = $1
             ORDER BY candidate_id, user_id"
        );
        sqlx::query_as::<_, InterviewRating>(&query)
            .bind(group_id)
            .fetch_all(pool)
            .await
    }
}
