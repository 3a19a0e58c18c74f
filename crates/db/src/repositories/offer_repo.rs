//! Repository for the `offers` table.

use nuhire_core::offer::OfferStatus;
use nuhire_core::types::DbId;
use sqlx::{PgConnection, PgExecutor, PgPool};

use crate::models::offer::{CreateOffer, Offer};

const COLUMNS: &str = "id, group_id, class_id, candidate_id, status, submitted_by, decided_by, \
                        decided_at, created_at, updated_at";

pub struct OfferRepo;

impl OfferRepo {
    /// Insert a pending offer. Fails on `uq_offers_pending_group` if the
    /// group already has one awaiting a decision.
    pub async fn create<'e, E>(executor: E, input: &CreateOffer) -> Result<Offer, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO offers (group_id, class_id, candidate_id, submitted_by)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Offer>(&query)
            .bind(input.group_id)
            .bind(input.class_id)
            .bind(input.candidate_id)
            .bind(input.submitted_by)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Offer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM offers WHERE id = $1");
        sqlx::query_as::<_, Offer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load an offer and lock it until the transaction ends.
    pub async fn lock_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Offer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM offers WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Offer>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Most recent offer for a group, if any.
    pub async fn latest_for_group<'e, E>(
        executor: E,
        group_id: DbId,
    ) -> Result<Option<Offer>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM offers
             WHERE group_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Offer>(&query)
            .bind(group_id)
            .fetch_optional(executor)
            .await
    }

    pub async fn list_by_group(pool: &PgPool, group_id: DbId) -> Result<Vec<Offer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM offers WHERE group_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Offer>(&query)
            .bind(group_id)
            .fetch_all(pool)
            .await
    }

    /// Offers in the classes an admin owns, optionally filtered by status.
    pub async fn list_for_admin(
        pool: &PgPool,
        admin_id: DbId,
        status: Option<OfferStatus>,
    ) -> Result<Vec<Offer>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM offers o
             JOIN classes c ON c.id = o.class_id
             WHERE c.admin_id = $1 AND ($2::text IS NULL OR o.status = $2)
             ORDER BY o.created_at DESC, o.id DESC",
            prefixed_columns("o")
        );
        sqlx::query_as::<_, Offer>(&query)
            .bind(admin_id)
            .bind(status.map(OfferStatus::as_str))
            .fetch_all(pool)
            .await
    }

    /// Record an admin decision.
    pub async fn set_status<'e, E>(
        executor: E,
        id: DbId,
        status: OfferStatus,
        decided_by: DbId,
    ) -> Result<Offer, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE offers SET status = $2, decided_by = $3, decided_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Offer>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(decided_by)
            .fetch_one(executor)
            .await
    }
}

fn prefixed_columns(alias: &str) -> String {
    COLUMNS
        .split(", ")
        .map(|c| format!("{alias}.{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}
