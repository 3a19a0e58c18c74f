mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, delete_auth, get_auth, post_json_auth, progress_of, put_json_auth,
    seed_class, start_at,
};
use nuhire_core::progress::ProgressStep;
use nuhire_db::repositories::GroupRepo;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Profile and route access
// ---------------------------------------------------------------------------

/// A new student sees only the job description route.
#[sqlx::test(migrations = "../../db/migrations")]
async fn new_student_has_first_step_unlocked(pool: PgPool) {
    let fx = seed_class(&pool, "me", 1, 0).await;

    let response = get_auth(build_test_app(pool), "/api/v1/me", &fx.student_tokens[0]).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["progress"], "job_description");
    assert_eq!(json["data"]["user"]["role"], "student");
    assert_eq!(json["data"]["user"]["group_id"], fx.group.id);
    let unlocked = json["data"]["unlocked"].as_array().unwrap();
    assert_eq!(unlocked.len(), 1);
    assert_eq!(unlocked[0]["route"], "/jobdes");
}

/// Gated routes open as progress moves forward; ungated routes are always open.
#[sqlx::test(migrations = "../../db/migrations")]
async fn route_access_follows_progress(pool: PgPool) {
    let fx = seed_class(&pool, "access", 1, 0).await;
    start_at(&pool, &fx, ProgressStep::Res2).await;
    let token = &fx.student_tokens[0];

    let json = body_json(
        get_auth(build_test_app(pool.clone()), "/api/v1/me/access?route=/res-review", token).await,
    )
    .await;
    assert_eq!(json["data"]["allowed"], true);
    assert_eq!(json["data"]["required_step"], "res_1");

    let json = body_json(
        get_auth(
            build_test_app(pool.clone()),
            "/api/v1/me/access?route=/makeOffer",
            token,
        )
        .await,
    )
    .await;
    assert_eq!(json["data"]["allowed"], false);
    assert_eq!(json["data"]["required_step"], "offer");

    let json = body_json(
        get_auth(build_test_app(pool.clone()), "/api/v1/me/access?route=/notes", token).await,
    )
    .await;
    assert_eq!(json["data"]["allowed"], true);
    assert!(json["data"]["required_step"].is_null());

    // Admins may open anything.
    let json = body_json(
        get_auth(
            build_test_app(pool),
            "/api/v1/me/access?route=/employerPannel",
            &fx.admin_token,
        )
        .await,
    )
    .await;
    assert_eq!(json["data"]["allowed"], true);
}

// ---------------------------------------------------------------------------
// Individual advance
// ---------------------------------------------------------------------------

/// Students advance alone through the self-paced steps.
#[sqlx::test(migrations = "../../db/migrations")]
async fn student_advances_through_individual_steps(pool: PgPool) {
    let fx = seed_class(&pool, "advance", 2, 0).await;
    start_at(&pool, &fx, ProgressStep::JobDescription).await;
    let token = &fx.student_tokens[0];

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/me/progress/advance",
        token,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["progress"], "res_1");

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/me/progress/advance",
        token,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(progress_of(&pool, fx.students[0].id).await, ProgressStep::Res2);

    // The teammate did not move.
    assert_eq!(
        progress_of(&pool, fx.students[1].id).await,
        ProgressStep::JobDescription
    );
}

/// Group review cannot be left alone.
#[sqlx::test(migrations = "../../db/migrations")]
async fn advance_from_group_step_conflicts(pool: PgPool) {
    let fx = seed_class(&pool, "advance-res2", 1, 0).await;
    start_at(&pool, &fx, ProgressStep::Res2).await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/me/progress/advance",
        &fx.student_tokens[0],
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(progress_of(&pool, fx.students[0].id).await, ProgressStep::Res2);
}

/// Nothing moves before the instructor starts the group.
#[sqlx::test(migrations = "../../db/migrations")]
async fn advance_before_start_is_forbidden(pool: PgPool) {
    let fx = seed_class(&pool, "unstarted", 1, 0).await;

    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/me/progress/advance",
        &fx.student_tokens[0],
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Admin override can move a student backwards.
#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_can_override_progress(pool: PgPool) {
    let fx = seed_class(&pool, "override", 1, 0).await;
    start_at(&pool, &fx, ProgressStep::Interview).await;

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/admin/users/{}/progress", fx.students[0].id),
        &fx.admin_token,
        json!({ "progress": "res_1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(progress_of(&pool, fx.students[0].id).await, ProgressStep::Res1);
}

// ---------------------------------------------------------------------------
// Job description
// ---------------------------------------------------------------------------

/// Students read the job assigned to their group.
#[sqlx::test(migrations = "../../db/migrations")]
async fn student_reads_group_job(pool: PgPool) {
    let fx = seed_class(&pool, "job", 1, 0).await;

    let response = get_auth(build_test_app(pool), "/api/v1/me/job", &fx.student_tokens[0]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], fx.job.id);
    assert_eq!(json["data"]["title"], "Data Analyst");
}

/// A group without a job gets a conflict, not a 404.
#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_job_is_conflict(pool: PgPool) {
    let fx = seed_class(&pool, "nojob", 1, 0).await;
    GroupRepo::set_job(&pool, fx.group.id, None).await.unwrap();

    let response = get_auth(build_test_app(pool), "/api/v1/me/job", &fx.student_tokens[0]).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

/// Notes are private to their author.
#[sqlx::test(migrations = "../../db/migrations")]
async fn notes_are_scoped_to_author(pool: PgPool) {
    let fx = seed_class(&pool, "notes", 2, 0).await;
    let (mine, theirs) = (&fx.student_tokens[0], &fx.student_tokens[1]);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/v1/notes",
        mine,
        json!({ "content": "Candidate 2 has strong SQL" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let note_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let json = body_json(get_auth(build_test_app(pool.clone()), "/api/v1/notes", theirs).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);

    let response = put_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/notes/{note_id}"),
        theirs,
        json!({ "content": "hijacked" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(
        build_test_app(pool.clone()),
        &format!("/api/v1/notes/{note_id}"),
        mine,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let json = body_json(get_auth(build_test_app(pool), "/api/v1/notes", mine).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}

/// Empty notes are rejected.
#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_note_is_rejected(pool: PgPool) {
    let fx = seed_class(&pool, "empty-note", 1, 0).await;

    let response = post_json_auth(
        build_test_app(pool),
        "/api/v1/notes",
        &fx.student_tokens[0],
        json!({ "content": "" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
