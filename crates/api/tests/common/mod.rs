#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use nuhire_api::auth::jwt::{generate_access_token, JwtConfig};
use nuhire_api::auth::password::hash_password;
use nuhire_api::config::ServerConfig;
use nuhire_api::router::build_app_router;
use nuhire_api::state::AppState;
use nuhire_api::ws::WsManager;
use nuhire_core::progress::ProgressStep;
use nuhire_core::quorum::SHORTLIST_SIZE;
use nuhire_core::roles::{ROLE_ADMIN, ROLE_ADMIN_ID, ROLE_STUDENT, ROLE_STUDENT_ID};
use nuhire_core::types::DbId;
use nuhire_db::models::candidate::{Candidate, CreateCandidate};
use nuhire_db::models::class::{Class, CreateClass};
use nuhire_db::models::group::{CreateGroup, Group};
use nuhire_db::models::job::{CreateJob, Job};
use nuhire_db::models::user::{CreateUser, User};
use nuhire_db::repositories::{
    CandidateRepo, ClassRepo, GroupRepo, JobRepo, ShortlistRepo, UserRepo,
};
use nuhire_events::EventBus;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "hiring-sim-2024";

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        session_cleanup_interval_secs: 3600,
        session_retention_hours: 24,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

pub fn build_test_state(pool: PgPool) -> AppState {
    AppState {
        pool,
        config: Arc::new(test_config()),
        ws_manager: Arc::new(WsManager::new()),
        event_bus: Arc::new(EventBus::default()),
    }
}

/// Full router with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_router(build_test_state(pool))
}

pub fn app_for(state: &AppState) -> Router {
    build_app_router(state.clone())
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user. Only users created with `with_password` can log in.
pub async fn create_user(
    pool: &PgPool,
    email: &str,
    role_id: DbId,
    class_id: Option<DbId>,
    with_password: bool,
) -> User {
    let password_hash = if with_password {
        hash_password(TEST_PASSWORD).unwrap()
    } else {
        "not-a-valid-hash".to_string()
    };
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            first_name: "Test".to_string(),
            last_name: email.split('@').next().unwrap_or("user").to_string(),
            password_hash,
            role_id,
            class_id,
        },
    )
    .await
    .unwrap()
}

pub fn token_for(user: &User) -> String {
    let role = if user.role_id == ROLE_ADMIN_ID {
        ROLE_ADMIN
    } else {
        ROLE_STUDENT
    };
    generate_access_token(user.id, role, &test_config().jwt).unwrap()
}

/// One admin, one class with a job, one group of students and some
/// candidates.
pub struct ClassFixture {
    pub admin: User,
    pub admin_token: String,
    pub class: Class,
    pub job: Job,
    pub group: Group,
    pub students: Vec<User>,
    pub student_tokens: Vec<String>,
    pub candidates: Vec<Candidate>,
}

impl ClassFixture {
    pub fn group_uri(&self, rest: &str) -> String {
        format!("/api/v1/groups/{}{rest}", self.group.id)
    }

    pub fn candidate_ids(&self) -> Vec<DbId> {
        self.candidates.iter().map(|c| c.id).collect()
    }
}

/// Build a class with `members` students in one unstarted group and
/// `candidates` candidates. `tag` keeps emails unique across fixtures.
pub async fn seed_class(pool: &PgPool, tag: &str, members: usize, candidates: usize) -> ClassFixture {
    let admin = create_user(pool, &format!("admin-{tag}@nuhire.test"), ROLE_ADMIN_ID, None, false).await;
    let class = ClassRepo::create(
        pool,
        &CreateClass {
            name: format!("Class {tag}"),
            admin_id: admin.id,
        },
    )
    .await
    .unwrap();
    let job = JobRepo::create(
        pool,
        &CreateJob {
            class_id: class.id,
            title: "Data Analyst".to_string(),
            description: Some("Entry level analyst role".to_string()),
            file_path: Some("jobdes/analyst.pdf".to_string()),
        },
    )
    .await
    .unwrap();
    let group = GroupRepo::create(
        pool,
        &CreateGroup {
            class_id: class.id,
            group_number: 1,
            job_id: Some(job.id),
        },
    )
    .await
    .unwrap();

    let mut students = Vec::with_capacity(members);
    for i in 0..members {
        let user = create_user(
            pool,
            &format!("student{i}-{tag}@nuhire.test"),
            ROLE_STUDENT_ID,
            Some(class.id),
            false,
        )
        .await;
        let user = UserRepo::assign_group(pool, user.id, class.id, Some(group.id))
            .await
            .unwrap()
            .unwrap();
        students.push(user);
    }

    let mut seeded = Vec::with_capacity(candidates);
    for i in 0..candidates {
        seeded.push(
            CandidateRepo::create(
                pool,
                &CreateCandidate {
                    class_id: class.id,
                    name: format!("Candidate {i}"),
                    resume_path: format!("resumes/{i}.pdf"),
                    interview_video_url: Some(format!("https://videos.test/{i}")),
                },
            )
            .await
            .unwrap(),
        );
    }

    ClassFixture {
        admin_token: token_for(&admin),
        student_tokens: students.iter().map(token_for).collect(),
        admin,
        class,
        job,
        group,
        students,
        candidates: seeded,
    }
}

/// Start the fixture's group and put every member at `step`.
///
/// A group past `res_2` has confirmed its shortlist, so the first
/// `SHORTLIST_SIZE` candidates are checked for it.
pub async fn start_at(pool: &PgPool, fx: &ClassFixture, step: ProgressStep) {
    GroupRepo::start(pool, fx.group.id).await.unwrap();
    for student in &fx.students {
        UserRepo::set_progress(pool, student.id, step).await.unwrap();
    }
    if step > ProgressStep::Res2 {
        let checked_by = fx.students.first().map_or(fx.admin.id, |s| s.id);
        for candidate in fx.candidates.iter().take(SHORTLIST_SIZE) {
            ShortlistRepo::check(pool, fx.group.id, candidate.id, checked_by)
                .await
                .unwrap();
        }
    }
}

pub async fn progress_of(pool: &PgPool, user_id: DbId) -> ProgressStep {
    UserRepo::find_by_id(pool, user_id)
        .await
        .unwrap()
        .unwrap()
        .progress_step()
        .unwrap()
}
