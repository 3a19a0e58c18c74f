//! Periodic purge of refresh sessions.
//!
//! Expired tokens go at once. Spent tokens (rotated, logged out, revoked on
//! deactivation) are kept for a retention window first so recent logins
//! stay inspectable.

use std::time::Duration;

use chrono::Utc;
use nuhire_db::repositories::RefreshSessionRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Run one sweep. Returns the number of deleted sessions.
pub async fn sweep(pool: &PgPool, retention: Duration) -> Result<u64, sqlx::Error> {
    let retention = chrono::Duration::from_std(retention).unwrap_or(chrono::Duration::MAX);
    let spent_before = Utc::now()
        .checked_sub_signed(retention)
        .unwrap_or(chrono::DateTime::<Utc>::MIN_UTC);
    RefreshSessionRepo::purge(pool, spent_before).await
}

/// Sweep every `interval` until `cancel` fires. The first sweep runs at once.
pub async fn run(pool: PgPool, interval: Duration, retention: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        retention_secs = retention.as_secs(),
        "Session cleanup job started"
    );
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => match sweep(&pool, retention).await {
                Ok(0) => {}
                Ok(deleted) => tracing::info!(deleted, "Purged refresh sessions"),
                Err(e) => tracing::error!(error = %e, "Refresh session purge failed"),
            },
        }
    }
    tracing::info!("Session cleanup job stopped");
}
