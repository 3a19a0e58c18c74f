//! Repository for the `group_confirmations` table.
//!
//! There is at most one row per (group, action, user); a member confirming
//! again replaces their subject.

use nuhire_core::quorum::GroupAction;
use nuhire_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::confirmation::GroupConfirmation;

const COLUMNS: &str = "id, group_id, action, user_id, subject, created_at, updated_at";

pub struct ConfirmationRepo;

impl ConfirmationRepo {
    pub async fn upsert<'e, E>(
        executor: E,
        group_id: DbId,
        action: GroupAction,
        user_id: DbId,
        subject: &str,
    ) -> Result<GroupConfirmation, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO group_confirmations (group_id, action, user_id, subject)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_group_confirmations_group_action_user
             DO UPDATE SET subject = EXCLUDED.subject
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GroupConfirmation>(&query)
            .bind(group_id)
            .bind(action.as_str())
            .bind(user_id)
            .bind(subject)
            .fetch_one(executor)
            .await
    }

    pub async fn list_for_action<'e, E>(
        executor: E,
        group_id: DbId,
        action: GroupAction,
    ) -> Result<Vec<GroupConfirmation>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM group_confirmations
             WHERE group_id = $1 AND action = $2
             ORDER BY updated_at, id"
        );
        sqlx::query_as::<_, GroupConfirmation>(&query)
            .bind(group_id)
            .bind(action.as_str())
            .fetch_all(executor)
            .await
    }

    /// Remove one member's confirmation. Returns `true` if a row was removed.
    pub async fn delete_for_user<'e, E>(
        executor: E,
        group_id: DbId,
        action: GroupAction,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "DELETE FROM group_confirmations WHERE group_id = $1 AND action = $2 AND user_id = $3",
        )
        .bind(group_id)
        .bind(action.as_str())
        .bind(user_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove every confirmation of an action for a group.
    pub async fn clear_action<'e, E>(
        executor: E,
        group_id: DbId,
        action: GroupAction,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result =
            sqlx::query("DELETE FROM group_confirmations WHERE group_id = $1 AND action = $2")
                .bind(group_id)
                .bind(action.as_str())
                .execute(executor)
                .await?;
        Ok(result.rows_affected())
    }
}
