//! Repository for the `notes` table.
//!
//! Every query is scoped by `user_id`: notes are private to their author.

use nuhire_core::types::DbId;
use sqlx::PgPool;

use crate::models::note::Note;

const COLUMNS: &str = "id, user_id, content, created_at, updated_at";

pub struct NoteRepo;

impl NoteRepo {
    pub async fn create(pool: &PgPool, user_id: DbId, content: &str) -> Result<Note, sqlx::Error> {
        let query =
            format!("INSERT INTO notes (user_id, content) VALUES ($1, $2) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Note>(&query)
            .bind(user_id)
            .bind(content)
            .fetch_one(pool)
            .await
    }

    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Note>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notes WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Update a note's content. Returns `None` if the note is not the user's.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        content: &str,
    ) -> Result<Option<Note>, sqlx::Error> {
        let query = format!(
            "UPDATE notes SET content = $3 WHERE id = $1 AND user_id = $2 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .bind(user_id)
            .bind(content)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
