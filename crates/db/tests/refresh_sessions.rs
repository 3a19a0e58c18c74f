//! Refresh-token storage: single-use consumption and the purge sweep.

use chrono::{Duration, Utc};
use nuhire_core::roles::ROLE_STUDENT_ID;
use nuhire_db::models::refresh_session::NewRefreshSession;
use nuhire_db::models::user::CreateUser;
use nuhire_db::repositories::{RefreshSessionRepo, UserRepo};
use sqlx::PgPool;

async fn user_id(pool: &PgPool) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role_id: ROLE_STUDENT_ID,
            class_id: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn issue(pool: &PgPool, user_id: i64, hash: &str, expires_in: Duration) {
    RefreshSessionRepo::issue(
        pool,
        &NewRefreshSession {
            user_id,
            token_hash: hash.to_string(),
            expires_at: Utc::now() + expires_in,
        },
    )
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_token_is_consumed_once(pool: PgPool) {
    let user = user_id(&pool).await;
    issue(&pool, user, "live", Duration::days(7)).await;

    let spent = RefreshSessionRepo::consume(&pool, "live").await.unwrap().unwrap();
    assert_eq!(spent.user_id, user);
    assert!(spent.revoked_at.is_some());
    assert!(RefreshSessionRepo::consume(&pool, "live").await.unwrap().is_none());
    assert!(RefreshSessionRepo::consume(&pool, "unknown").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_expired_token_is_not_consumed(pool: PgPool) {
    let user = user_id(&pool).await;
    issue(&pool, user, "stale", Duration::seconds(-5)).await;

    assert!(RefreshSessionRepo::consume(&pool, "stale").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_purge_keeps_recently_spent_and_live_tokens(pool: PgPool) {
    let user = user_id(&pool).await;
    issue(&pool, user, "live", Duration::days(7)).await;
    issue(&pool, user, "spent", Duration::days(7)).await;
    issue(&pool, user, "expired", Duration::seconds(-5)).await;
    RefreshSessionRepo::consume(&pool, "spent").await.unwrap();

    // Spent just now, so inside a one-hour retention window.
    let deleted = RefreshSessionRepo::purge(&pool, Utc::now() - Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(deleted, 1);
    assert_eq!(RefreshSessionRepo::count_live_for_user(&pool, user).await.unwrap(), 1);

    // A cutoff in the future removes the spent token too.
    let deleted = RefreshSessionRepo::purge(&pool, Utc::now() + Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(deleted, 1);

    assert_eq!(RefreshSessionRepo::revoke_for_user(&pool, user).await.unwrap(), 1);
    assert_eq!(RefreshSessionRepo::count_live_for_user(&pool, user).await.unwrap(), 0);
}
