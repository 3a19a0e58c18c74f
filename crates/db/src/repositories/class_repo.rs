//! Repository for the `classes` table.

use nuhire_core::types::DbId;
use sqlx::PgPool;

use crate::models::class::{Class, CreateClass};

const COLUMNS: &str = "id, name, admin_id, created_at, updated_at";

pub struct ClassRepo;

impl ClassRepo {
    pub async fn create(pool: &PgPool, input: &CreateClass) -> Result<Class, sqlx::Error> {
        let query = format!(
            "INSERT INTO classes (name, admin_id) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Class>(&query)
            .bind(&input.name)
            .bind(input.admin_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Class>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM classes WHERE id = $1");
        sqlx::query_as::<_, Class>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Classes owned by one admin, newest first.
    pub async fn list_by_admin(pool: &PgPool, admin_id: DbId) -> Result<Vec<Class>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM classes WHERE admin_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Class>(&query)
            .bind(admin_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a class and, through cascades, its groups, jobs and candidates.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM classes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
