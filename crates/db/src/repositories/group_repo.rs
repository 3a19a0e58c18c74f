//! Repository for the `groups` table.

use nuhire_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::group::{CreateGroup, Group};

const COLUMNS: &str =
    "id, class_id, group_number, job_id, started, started_at, created_at, updated_at";

pub struct GroupRepo;

impl GroupRepo {
    pub async fn create(pool: &PgPool, input: &CreateGroup) -> Result<Group, sqlx::Error> {
        let query = format!(
            "INSERT INTO groups (class_id, group_number, job_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Group>(&query)
            .bind(input.class_id)
            .bind(input.group_number)
            .bind(input.job_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Group>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM groups WHERE id = $1");
        sqlx::query_as::<_, Group>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load a group and hold a row lock on it until the transaction ends.
    ///
    /// Every quorum evaluation for the group takes this lock first, so
    /// concurrent confirmations are applied one at a time.
    pub async fn lock_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Group>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM groups WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Group>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn list_by_class(pool: &PgPool, class_id: DbId) -> Result<Vec<Group>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM groups WHERE class_id = $1 ORDER BY group_number");
        sqlx::query_as::<_, Group>(&query)
            .bind(class_id)
            .fetch_all(pool)
            .await
    }

    pub async fn set_job(
        pool: &PgPool,
        id: DbId,
        job_id: Option<DbId>,
    ) -> Result<Option<Group>, sqlx::Error> {
        let query = format!("UPDATE groups SET job_id = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Group>(&query)
            .bind(id)
            .bind(job_id)
            .fetch_optional(pool)
            .await
    }

    /// Mark a group as started.
    ///
    /// Returns `None` if the group does not exist or was already started.
    pub async fn start(pool: &PgPool, id: DbId) -> Result<Option<Group>, sqlx::Error> {
        let query = format!(
            "UPDATE groups SET started = true, started_at = NOW()
             WHERE id = $1 AND started = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Group>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
