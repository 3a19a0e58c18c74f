//! Repository for the `refresh_sessions` table.
//!
//! Refresh tokens are single use: [`RefreshSessionRepo::consume`] spends a
//! token with one conditional `UPDATE`, so two concurrent refreshes with
//! the same token cannot both succeed.

use nuhire_core::types::{DbId, Timestamp};
use sqlx::{PgExecutor, PgPool};

use crate::models::refresh_session::{NewRefreshSession, RefreshSession};

const COLUMNS: &str = "id, user_id, token_hash, expires_at, revoked_at, created_at, updated_at";

pub struct RefreshSessionRepo;

impl RefreshSessionRepo {
    pub async fn issue<'e, E>(
        executor: E,
        input: &NewRefreshSession,
    ) -> Result<RefreshSession, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO refresh_sessions (user_id, token_hash, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RefreshSession>(&query)
            .bind(input.user_id)
            .bind(&input.token_hash)
            .bind(input.expires_at)
            .fetch_one(executor)
            .await
    }

    /// Spend a live token. Returns the session it belonged to, or `None`
    /// when the token is unknown, expired or already spent.
    pub async fn consume<'e, E>(
        executor: E,
        token_hash: &str,
    ) -> Result<Option<RefreshSession>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE refresh_sessions SET revoked_at = NOW()
             WHERE token_hash = $1 AND revoked_at IS NULL AND expires_at > NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RefreshSession>(&query)
            .bind(token_hash)
            .fetch_optional(executor)
            .await
    }

    /// Spend every live token of a user (logout, deactivation).
    pub async fn revoke_for_user<'e, E>(executor: E, user_id: DbId) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE refresh_sessions SET revoked_at = NOW()
             WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_live_for_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM refresh_sessions
             WHERE user_id = $1 AND revoked_at IS NULL AND expires_at > NOW()",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Delete expired tokens and tokens spent before `spent_before`.
    pub async fn purge(pool: &PgPool, spent_before: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM refresh_sessions
             WHERE expires_at < NOW() OR revoked_at < $1",
        )
        .bind(spent_before)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
