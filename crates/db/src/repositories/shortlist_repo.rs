//! Repository for the `group_shortlist` table.

use nuhire_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::shortlist::ShortlistEntry;

const COLUMNS: &str = "id, group_id, candidate_id, checked_by, created_at";

pub struct ShortlistRepo;

impl ShortlistRepo {
    /// Check a candidate. Checking an already-checked candidate is a no-op.
    ///
    /// Returns `true` if a row was inserted.
    pub async fn check<'e, E>(
        executor: E,
        group_id: DbId,
        candidate_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "INSERT INTO group_shortlist (group_id, candidate_id, checked_by)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_group_shortlist_group_candidate DO NOTHING",
        )
        .bind(group_id)
        .bind(candidate_id)
        .bind(user_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Uncheck a candidate. Returns `true` if a row was removed.
    pub async fn uncheck<'e, E>(
        executor: E,
        group_id: DbId,
        candidate_id: DbId,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result =
            sqlx::query("DELETE FROM group_shortlist WHERE group_id = $1 AND candidate_id = $2")
                .bind(group_id)
                .bind(candidate_id)
                .execute(executor)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_by_group(
        pool: &PgPool,
        group_id: DbId,
    ) -> Result<Vec<ShortlistEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM group_shortlist WHERE group_id = $1 ORDER BY candidate_id"
        );
        sqlx::query_as::<_, ShortlistEntry>(&query)
            .bind(group_id)
            .fetch_all(pool)
            .await
    }

    /// Checked candidate ids for a group, ascending.
    pub async fn checked_ids<'e, E>(executor: E, group_id: DbId) -> Result<Vec<DbId>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, DbId>(
            "SELECT candidate_id FROM group_shortlist WHERE group_id = $1 ORDER BY candidate_id",
        )
        .bind(group_id)
        .fetch_all(executor)
        .await
    }
}
