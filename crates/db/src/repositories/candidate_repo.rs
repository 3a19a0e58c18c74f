//! Repository for the `candidates` table.

use nuhire_core::types::DbId;
use sqlx::PgPool;

use crate::models::candidate::{Candidate, CreateCandidate, UpdateCandidate};

const COLUMNS: &str =
    "id, class_id, name, resume_path, interview_video_url, created_at, updated_at";

pub struct CandidateRepo;

impl CandidateRepo {
    pub async fn create(pool: &PgPool, input: &CreateCandidate) -> Result<Candidate, sqlx::Error> {
        let query = format!(
            "INSERT INTO candidates (class_id, name, resume_path, interview_video_url)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Candidate>(&query)
            .bind(input.class_id)
            .bind(&input.name)
            .bind(&input.resume_path)
            .bind(&input.interview_video_url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Candidate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM candidates WHERE id = $1");
        sqlx::query_as::<_, Candidate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_class(
        pool: &PgPool,
        class_id: DbId,
    ) -> Result<Vec<Candidate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM candidates WHERE class_id = $1 ORDER BY id");
        sqlx::query_as::<_, Candidate>(&query)
            .bind(class_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCandidate,
    ) -> Result<Option<Candidate>, sqlx::Error> {
        let query = format!(
            "UPDATE candidates SET
                name = COALESCE($2, name),
                resume_path = COALESCE($3, resume_path),
                interview_video_url = COALESCE($4, interview_video_url)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Candidate>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.resume_path)
            .bind(&input.interview_video_url)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM candidates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
