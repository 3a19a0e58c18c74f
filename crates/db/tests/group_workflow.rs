//! Repository-level tests for the group workflow tables.
//!
//! Covers the uniqueness rules the workflow relies on:
//! - one vote / rating per (user, candidate), replaced on re-submit
//! - one confirmation per (group, action, user)
//! - at most one pending offer per group
//! - forward-only group progress advances

use assert_matches::assert_matches;
use nuhire_core::offer::OfferStatus;
use nuhire_core::progress::ProgressStep;
use nuhire_core::quorum::GroupAction;
use nuhire_core::roles::{ROLE_ADMIN_ID, ROLE_STUDENT_ID};
use nuhire_core::vote::{InterviewScores, VoteChoice};
use nuhire_db::models::candidate::CreateCandidate;
use nuhire_db::models::class::CreateClass;
use nuhire_db::models::group::CreateGroup;
use nuhire_db::models::offer::CreateOffer;
use nuhire_db::models::rating::UpsertRating;
use nuhire_db::models::user::{CreateUser, UpdateUser, User};
use nuhire_db::repositories::{
    CandidateRepo, ClassRepo, ConfirmationRepo, GroupRepo, NoteRepo, OfferRepo, RatingRepo,
    ShortlistRepo, UserRepo, VoteRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_user(pool: &PgPool, email: &str, role_id: i64) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            first_name: "Test".to_string(),
            last_name: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role_id,
            class_id: None,
        },
    )
    .await
    .unwrap()
}

/// An admin-owned class with one group of `members` students and two candidates.
struct Fixture {
    class_id: i64,
    group_id: i64,
    members: Vec<User>,
    candidates: Vec<i64>,
}

async fn fixture(pool: &PgPool, members: usize) -> Fixture {
    let admin = new_user(pool, "admin@example.com", ROLE_ADMIN_ID).await;
    let class = ClassRepo::create(
        pool,
        &CreateClass {
            name: "HRMT 2201".to_string(),
            admin_id: admin.id,
        },
    )
    .await
    .unwrap();
    let group = GroupRepo::create(
        pool,
        &CreateGroup {
            class_id: class.id,
            group_number: 1,
            job_id: None,
        },
    )
    .await
    .unwrap();

    let mut users = Vec::new();
    for i in 0..members {
        let u = new_user(pool, &format!("s{i}@example.com"), ROLE_STUDENT_ID).await;
        let u = UserRepo::assign_group(pool, u.id, class.id, Some(group.id))
            .await
            .unwrap()
            .unwrap();
        users.push(u);
    }

    let mut candidates = Vec::new();
    for name in ["Ada", "Grace"] {
        let c = CandidateRepo::create(
            pool,
            &CreateCandidate {
                class_id: class.id,
                name: name.to_string(),
                resume_path: format!("resumes/{name}.pdf"),
                interview_video_url: None,
            },
        )
        .await
        .unwrap();
        candidates.push(c.id);
    }

    Fixture {
        class_id: class.id,
        group_id: group.id,
        members: users,
        candidates,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_vote_upsert_replaces_previous_vote(pool: PgPool) {
    let f = fixture(&pool, 2).await;
    let (a, b) = (f.members[0].id, f.members[1].id);
    let cand = f.candidates[0];

    VoteRepo::upsert(&pool, a, f.group_id, cand, VoteChoice::Yes).await.unwrap();
    VoteRepo::upsert(&pool, b, f.group_id, cand, VoteChoice::Yes).await.unwrap();
    VoteRepo::upsert(&pool, a, f.group_id, cand, VoteChoice::No).await.unwrap();

    let counts = VoteRepo::counts_for_candidate(&pool, f.group_id, cand).await.unwrap();
    let count_of = |v: &str| counts.iter().find(|c| c.vote == v).map_or(0, |c| c.count);
    assert_eq!(count_of("yes"), 1);
    assert_eq!(count_of("no"), 1);
    assert_eq!(VoteRepo::list_by_group(&pool, f.group_id).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_shortlist_check_is_idempotent(pool: PgPool) {
    let f = fixture(&pool, 1).await;
    let user = f.members[0].id;

    assert!(ShortlistRepo::check(&pool, f.group_id, f.candidates[1], user).await.unwrap());
    assert!(!ShortlistRepo::check(&pool, f.group_id, f.candidates[1], user).await.unwrap());
    assert!(ShortlistRepo::check(&pool, f.group_id, f.candidates[0], user).await.unwrap());

    let ids = ShortlistRepo::checked_ids(&pool, f.group_id).await.unwrap();
    assert_eq!(ids, vec![f.candidates[0], f.candidates[1]]);

    assert!(ShortlistRepo::uncheck(&pool, f.group_id, f.candidates[0]).await.unwrap());
    assert!(!ShortlistRepo::uncheck(&pool, f.group_id, f.candidates[0]).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_confirmation_is_one_row_per_member(pool: PgPool) {
    let f = fixture(&pool, 2).await;
    let action = GroupAction::ConfirmShortlist;
    let a = f.members[0].id;

    ConfirmationRepo::upsert(&pool, f.group_id, action, a, "1,2").await.unwrap();
    let replaced = ConfirmationRepo::upsert(&pool, f.group_id, action, a, "1,3").await.unwrap();
    assert_eq!(replaced.subject, "1,3");

    let rows = ConfirmationRepo::list_for_action(&pool, f.group_id, action).await.unwrap();
    assert_eq!(rows.len(), 1);

    // Other actions are independent.
    ConfirmationRepo::upsert(&pool, f.group_id, GroupAction::FinishInterviews, a, "interviews")
        .await
        .unwrap();
    assert_eq!(ConfirmationRepo::clear_action(&pool, f.group_id, action).await.unwrap(), 1);
    assert_eq!(
        ConfirmationRepo::list_for_action(&pool, f.group_id, GroupAction::FinishInterviews)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_only_one_pending_offer_per_group(pool: PgPool) {
    let f = fixture(&pool, 1).await;
    let input = CreateOffer {
        group_id: f.group_id,
        class_id: f.class_id,
        candidate_id: f.candidates[0],
        submitted_by: f.members[0].id,
    };

    let first = OfferRepo::create(&pool, &input).await.unwrap();
    let err = OfferRepo::create(&pool, &input).await.unwrap_err();
    assert_matches!(
        err,
        sqlx::Error::Database(ref db) if db.constraint() == Some("uq_offers_pending_group")
    );

    // Once rejected, the group may submit again.
    OfferRepo::set_status(&pool, first.id, OfferStatus::Rejected, f.members[0].id)
        .await
        .unwrap();
    let second = OfferRepo::create(&pool, &input).await.unwrap();
    let latest = OfferRepo::latest_for_group(&pool, f.group_id).await.unwrap().unwrap();
    assert_eq!(latest.id, second.id);
    assert_eq!(latest.status().unwrap(), OfferStatus::Pending);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_group_progress_only_moves_forward(pool: PgPool) {
    let f = fixture(&pool, 3).await;
    UserRepo::set_progress(&pool, f.members[0].id, ProgressStep::Offer)
        .await
        .unwrap();

    let advanced = UserRepo::advance_group_progress(&pool, f.group_id, ProgressStep::Interview)
        .await
        .unwrap();
    assert_eq!(advanced, 2);

    let ahead = UserRepo::find_by_id(&pool, f.members[0].id).await.unwrap().unwrap();
    assert_eq!(ahead.progress_step().unwrap(), ProgressStep::Offer);
    let moved = UserRepo::find_by_id(&pool, f.members[1].id).await.unwrap().unwrap();
    assert_eq!(moved.progress_step().unwrap(), ProgressStep::Interview);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_electorate_counts_active_students_only(pool: PgPool) {
    let f = fixture(&pool, 3).await;
    UserRepo::deactivate(&pool, f.members[2].id).await.unwrap();

    let ids = UserRepo::list_member_ids(&pool, f.group_id).await.unwrap();
    assert_eq!(ids, vec![f.members[0].id, f.members[1].id]);

    // Promoting a member to admin takes them out of the group.
    let promoted = UserRepo::update(
        &pool,
        f.members[1].id,
        &UpdateUser {
            role_id: Some(ROLE_ADMIN_ID),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(promoted.group_id, None);

    let ids = UserRepo::list_member_ids(&pool, f.group_id).await.unwrap();
    assert_eq!(ids, vec![f.members[0].id]);
    let members = UserRepo::list_group_members(&pool, f.group_id).await.unwrap();
    assert_eq!(members.len(), 1);

    // Profile edits leave group membership alone.
    let renamed = UserRepo::update(
        &pool,
        f.members[0].id,
        &UpdateUser {
            first_name: Some("Renamed".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(renamed.group_id, Some(f.group_id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_group_start_happens_once(pool: PgPool) {
    let f = fixture(&pool, 1).await;
    let started = GroupRepo::start(&pool, f.group_id).await.unwrap().unwrap();
    assert!(started.started);
    assert!(started.started_at.is_some());
    assert!(GroupRepo::start(&pool, f.group_id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rating_range_enforced_by_schema(pool: PgPool) {
    let f = fixture(&pool, 1).await;
    let mut input = UpsertRating {
        user_id: f.members[0].id,
        group_id: f.group_id,
        candidate_id: f.candidates[0],
        scores: InterviewScores {
            overall: 7,
            professional_presence: 8,
            communication: 6,
            personal_quality: 9,
        },
    };
    RatingRepo::upsert(&pool, &input).await.unwrap();

    input.scores.overall = 3;
    let updated = RatingRepo::upsert(&pool, &input).await.unwrap();
    assert_eq!(updated.overall, 3);
    assert_eq!(RatingRepo::list_by_group(&pool, f.group_id).await.unwrap().len(), 1);

    input.scores.communication = 11;
    assert!(RatingRepo::upsert(&pool, &input).await.is_err());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_notes_are_scoped_to_author(pool: PgPool) {
    let f = fixture(&pool, 2).await;
    let (a, b) = (f.members[0].id, f.members[1].id);
    let note = NoteRepo::create(&pool, a, "Ada looks strong").await.unwrap();

    assert!(NoteRepo::update(&pool, note.id, b, "hijacked").await.unwrap().is_none());
    assert!(!NoteRepo::delete(&pool, note.id, b).await.unwrap());
    assert!(NoteRepo::list_by_user(&pool, b).await.unwrap().is_empty());

    let edited = NoteRepo::update(&pool, note.id, a, "Ada is the one").await.unwrap().unwrap();
    assert_eq!(edited.content, "Ada is the one");
    assert!(NoteRepo::delete(&pool, note.id, a).await.unwrap());
}
