//! Repository for the append-only `events` table.

use nuhire_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::EventRow;

const COLUMNS: &str = "id, event_type, source_entity_type, source_entity_id, actor_user_id, \
                        payload, created_at";

pub struct EventRepo;

impl EventRepo {
    /// Append an event. Returns the new row id.
    pub async fn insert(
        pool: &PgPool,
        event_type: &str,
        source_entity_type: Option<&str>,
        source_entity_id: Option<DbId>,
        actor_user_id: Option<DbId>,
        payload: &serde_json::Value,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "INSERT INTO events (event_type, source_entity_type, source_entity_id, actor_user_id, payload)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(event_type)
        .bind(source_entity_type)
        .bind(source_entity_id)
        .bind(actor_user_id)
        .bind(payload)
        .fetch_one(pool)
        .await
    }

    /// Newest-first page of events.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<EventRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events ORDER BY id DESC LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, EventRow>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Newest-first page of events about one entity.
    pub async fn list_for_entity(
        pool: &PgPool,
        entity_type: &str,
        entity_id: DbId,
        limit: i64,
    ) -> Result<Vec<EventRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events
             WHERE source_entity_type = $1 AND source_entity_id = $2
             ORDER BY id DESC LIMIT $3"
        );
        sqlx::query_as::<_, EventRow>(&query)
            .bind(entity_type)
            .bind(entity_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
