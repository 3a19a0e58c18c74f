mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, create_user, delete_auth, get, get_auth, post_json,
    post_json_auth, seed_class, TEST_PASSWORD,
};
use nuhire_core::roles::{ROLE_ADMIN_ID, ROLE_STUDENT_ID};
use nuhire_db::repositories::RefreshSessionRepo;
use serde_json::json;
use sqlx::PgPool;

async fn login(pool: &PgPool, email: &str, password: &str) -> axum::response::Response {
    post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/login",
        json!({ "email": email, "password": password }),
    )
    .await
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// A valid login returns a token pair and the user's role.
#[sqlx::test(migrations = "../../db/migrations")]
async fn login_returns_tokens(pool: PgPool) {
    let user = create_user(&pool, "ada@nuhire.test", ROLE_STUDENT_ID, None, true).await;

    let response = login(&pool, "ada@nuhire.test", TEST_PASSWORD).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["expires_in"], 15 * 60);
    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["role"], "student");
}

/// Wrong password and unknown email give the same 401.
#[sqlx::test(migrations = "../../db/migrations")]
async fn bad_credentials_are_unauthorized(pool: PgPool) {
    create_user(&pool, "ada@nuhire.test", ROLE_STUDENT_ID, None, true).await;

    let wrong = login(&pool, "ada@nuhire.test", "not-the-password").await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let wrong_json = body_json(wrong).await;

    let unknown = login(&pool, "nobody@nuhire.test", TEST_PASSWORD).await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown_json = body_json(unknown).await;

    assert_eq!(wrong_json["error"], unknown_json["error"]);
    assert_eq!(wrong_json["code"], "UNAUTHORIZED");
}

/// Five failures lock the account, even against the right password.
#[sqlx::test(migrations = "../../db/migrations")]
async fn repeated_failures_lock_account(pool: PgPool) {
    create_user(&pool, "ada@nuhire.test", ROLE_STUDENT_ID, None, true).await;

    for _ in 0..5 {
        let response = login(&pool, "ada@nuhire.test", "wrong-password").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = login(&pool, "ada@nuhire.test", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Refresh / logout
// ---------------------------------------------------------------------------

/// Refreshing rotates the token: the old refresh token stops working.
#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_rotates_token(pool: PgPool) {
    create_user(&pool, "ada@nuhire.test", ROLE_ADMIN_ID, None, true).await;
    let json = body_json(login(&pool, "ada@nuhire.test", TEST_PASSWORD).await).await;
    let first = json["refresh_token"].as_str().unwrap().to_string();

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": first }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let rotated = body_json(response).await;
    assert_ne!(rotated["refresh_token"], json!(first));
    assert_eq!(rotated["user"]["role"], "admin");

    let reused = post_json(
        build_test_app(pool),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": first }),
    )
    .await;
    assert_eq!(reused.status(), StatusCode::UNAUTHORIZED);
}

/// Logout revokes every refresh token of the caller.
#[sqlx::test(migrations = "../../db/migrations")]
async fn logout_revokes_sessions(pool: PgPool) {
    create_user(&pool, "ada@nuhire.test", ROLE_STUDENT_ID, None, true).await;
    let json = body_json(login(&pool, "ada@nuhire.test", TEST_PASSWORD).await).await;
    let access = json["access_token"].as_str().unwrap();
    let refresh = json["refresh_token"].as_str().unwrap();

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/auth/logout",
        access,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        build_test_app(pool),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Two refreshes racing with the same token: exactly one gets a new pair.
#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_token_is_single_use_under_race(pool: PgPool) {
    let user = create_user(&pool, "ada@nuhire.test", ROLE_STUDENT_ID, None, true).await;
    let json = body_json(login(&pool, "ada@nuhire.test", TEST_PASSWORD).await).await;
    let token = json["refresh_token"].as_str().unwrap().to_string();

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let app = build_test_app(pool.clone());
            let body = json!({ "refresh_token": token });
            tokio::spawn(async move { post_json(app, "/api/v1/auth/refresh", body).await })
        })
        .collect();
    let mut ok = 0;
    for handle in handles {
        match handle.await.unwrap().status() {
            StatusCode::OK => ok += 1,
            status => assert_eq!(status, StatusCode::UNAUTHORIZED),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(
        RefreshSessionRepo::count_live_for_user(&pool, user.id).await.unwrap(),
        1
    );
}

/// Deactivating an account spends its refresh tokens.
#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivation_revokes_refresh_tokens(pool: PgPool) {
    let fx = seed_class(&pool, "revoke", 0, 0).await;
    let user = create_user(&pool, "ada@nuhire.test", ROLE_STUDENT_ID, Some(fx.class.id), true).await;
    let json = body_json(login(&pool, "ada@nuhire.test", TEST_PASSWORD).await).await;
    let refresh = json["refresh_token"].as_str().unwrap().to_string();

    let response = delete_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/admin/users/{}", user.id),
        &fx.admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        build_test_app(pool),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Access control
// ---------------------------------------------------------------------------

/// Protected routes need a bearer token.
#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_token_is_unauthorized(pool: PgPool) {
    let response = get(build_test_app(pool), "/api/v1/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// A forged token is rejected.
#[sqlx::test(migrations = "../../db/migrations")]
async fn garbage_token_is_unauthorized(pool: PgPool) {
    let response = get_auth(build_test_app(pool), "/api/v1/me", "not.a.jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Students cannot reach admin routes.
#[sqlx::test(migrations = "../../db/migrations")]
async fn students_are_forbidden_from_admin_routes(pool: PgPool) {
    let fx = seed_class(&pool, "rbac", 1, 0).await;

    let response = get_auth(
        build_test_app(pool.clone()),
        "/api/v1/admin/classes",
        &fx.student_tokens[0],
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(build_test_app(pool), "/api/v1/admin/classes", &fx.admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
}
