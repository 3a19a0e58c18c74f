//! Repository for the `users` table.

use nuhire_core::progress::ProgressStep;
use nuhire_core::roles::ROLE_STUDENT_ID;
use nuhire_core::types::{DbId, Timestamp};
use sqlx::{PgExecutor, PgPool};

use crate::models::group::GroupMember;
use crate::models::user::{CreateUser, UpdateUser, User};

const COLUMNS: &str = "id, email, first_name, last_name, password_hash, role_id, class_id, \
                        group_id, progress, is_active, last_login_at, failed_login_count, \
                        locked_until, created_at, updated_at";

/// Progress values in workflow order, for ranking with `array_position`.
const PROGRESS_ORDER: &str =
    "ARRAY['job_description', 'res_1', 'res_2', 'interview', 'offer', 'employer']";

pub struct UserRepo;

impl UserRepo {
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, first_name, last_name, password_hash, role_id, class_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.email)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.password_hash)
            .bind(input.role_id)
            .bind(input.class_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<User>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a user by email. Emails are the login name and compared case-insensitively.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE lower(email) = lower($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY created_at DESC");
        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }

    /// Students enrolled in a class, by last name.
    pub async fn list_students_by_class(
        pool: &PgPool,
        class_id: DbId,
    ) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE class_id = $1 AND role_id = $2
             ORDER BY last_name, first_name"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(class_id)
            .bind(ROLE_STUDENT_ID)
            .fetch_all(pool)
            .await
    }

    /// Active student members of a group, as shown to other members.
    pub async fn list_group_members<'e, E>(
        executor: E,
        group_id: DbId,
    ) -> Result<Vec<GroupMember>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, GroupMember>(
            "SELECT id, email, first_name, last_name, progress FROM users
             WHERE group_id = $1 AND role_id = $2 AND is_active = true
             ORDER BY id",
        )
        .bind(group_id)
        .bind(ROLE_STUDENT_ID)
        .fetch_all(executor)
        .await
    }

    /// Ids of the active student members of a group. This is the quorum
    /// electorate: only students can confirm group actions.
    pub async fn list_member_ids<'e, E>(executor: E, group_id: DbId) -> Result<Vec<DbId>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM users
             WHERE group_id = $1 AND role_id = $2 AND is_active = true
             ORDER BY id",
        )
        .bind(group_id)
        .bind(ROLE_STUDENT_ID)
        .fetch_all(executor)
        .await
    }

    /// Update a user. Only non-`None` fields in `input` are applied.
    ///
    /// Groups hold students only, so a user whose role changes away from
    /// student leaves their group.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                email = COALESCE($2, email),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                role_id = COALESCE($5, role_id),
                class_id = COALESCE($6, class_id),
                is_active = COALESCE($7, is_active),
                group_id = CASE WHEN COALESCE($5, role_id) = $8 THEN group_id ELSE NULL END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.email)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(input.role_id)
            .bind(input.class_id)
            .bind(input.is_active)
            .bind(ROLE_STUDENT_ID)
            .fetch_optional(pool)
            .await
    }

    /// Place a user in a group (and that group's class). `None` removes them.
    pub async fn assign_group(
        pool: &PgPool,
        id: DbId,
        class_id: DbId,
        group_id: Option<DbId>,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET class_id = $2, group_id = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(class_id)
            .bind(group_id)
            .fetch_optional(pool)
            .await
    }

    /// Set one user's progress to an arbitrary step (admin override).
    pub async fn set_progress<'e, E>(
        executor: E,
        id: DbId,
        step: ProgressStep,
    ) -> Result<Option<User>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("UPDATE users SET progress = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(step.as_str())
            .fetch_optional(executor)
            .await
    }

    /// Move one user forward to `step` only if they are currently at `from`.
    ///
    /// Returns `None` when the user was not at `from` (a concurrent advance
    /// already happened).
    pub async fn advance_progress(
        pool: &PgPool,
        id: DbId,
        from: ProgressStep,
        step: ProgressStep,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET progress = $3
             WHERE id = $1 AND progress = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(from.as_str())
            .bind(step.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Move every active member of a group forward to `step`.
    ///
    /// Members already at or past `step` are left alone, so progress never
    /// moves backwards. Returns the number of users advanced.
    pub async fn advance_group_progress<'e, E>(
        executor: E,
        group_id: DbId,
        step: ProgressStep,
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE users SET progress = $2
             WHERE group_id = $1 AND role_id = $3 AND is_active = true
               AND array_position({PROGRESS_ORDER}, progress)
                   < array_position({PROGRESS_ORDER}, $2::text)"
        );
        let result = sqlx::query(&query)
            .bind(group_id)
            .bind(step.as_str())
            .bind(ROLE_STUDENT_ID)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Soft-deactivate a user. Returns `true` if the row was updated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET is_active = false WHERE id = $1 AND is_active = true")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn increment_failed_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET failed_login_count = failed_login_count + 1 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn lock_account(
        pool: &PgPool,
        id: DbId,
        until: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET locked_until = $2 WHERE id = $1")
            .bind(id)
            .bind(until)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Reset the failure counter and lock, and stamp `last_login_at`.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                failed_login_count = 0,
                locked_until = NULL,
                last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
