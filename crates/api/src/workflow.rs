//! Group workflow service.
//!
//! Every operation that changes shared group state lives here: votes, the
//! shortlist checkbox map, confirmations and their quorum effects, offer
//! decisions and starting a group. Operations that can race run in one
//! transaction holding a `FOR UPDATE` lock on the group row, so quorum
//! effects are applied exactly once. Events are published only after the
//! transaction commits.

use std::collections::BTreeMap;

use nuhire_core::error::CoreError;
use nuhire_core::event_names;
use nuhire_core::offer::{self, OfferStatus};
use nuhire_core::progress::{self, ProgressStep};
use nuhire_core::quorum::{
    self, Confirmation, GroupAction, QuorumStatus, INTERVIEWS_SUBJECT, SHORTLIST_SIZE,
};
use nuhire_core::types::DbId;
use nuhire_core::vote::{InterviewScores, VoteChoice, VoteTally};
use nuhire_db::models::candidate::Candidate;
use nuhire_db::models::class::Class;
use nuhire_db::models::group::{Group, GroupMember};
use nuhire_db::models::offer::{CreateOffer, Offer};
use nuhire_db::models::rating::{InterviewRating, UpsertRating};
use nuhire_db::models::user::User;
use nuhire_db::models::vote::VoteCount;
use nuhire_db::repositories::{
    CandidateRepo, ClassRepo, ConfirmationRepo, GroupRepo, OfferRepo, RatingRepo, ShortlistRepo,
    UserRepo, VoteRepo,
};
use nuhire_db::DbPool;
use nuhire_events::PlatformEvent;
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /groups/{id}/confirmations`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmRequest {
    pub action: GroupAction,
    /// `confirm_shortlist`: the shortlist being confirmed. Empty means the
    /// group's current checked shortlist.
    #[serde(default)]
    pub candidate_ids: Vec<DbId>,
    /// `submit_offer`: the candidate to make the offer to.
    pub candidate_id: Option<DbId>,
}

/// What happened when a confirmation completed the quorum.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConfirmEffect {
    ProgressAdvanced { step: ProgressStep },
    OfferSubmitted { offer: Offer },
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmOutcome {
    pub status: QuorumStatus,
    pub effect: Option<ConfirmEffect>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShortlistState {
    pub candidate_ids: Vec<DbId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateVotes {
    pub candidate_id: DbId,
    pub tally: VoteTally,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionStatus {
    pub action: GroupAction,
    pub status: QuorumStatus,
}

/// Everything a client needs to rebuild a group page after a reconnect.
#[derive(Debug, Clone, Serialize)]
pub struct GroupSnapshot {
    pub group: Group,
    pub members: Vec<GroupMember>,
    pub shortlist: Vec<DbId>,
    pub votes: Vec<CandidateVotes>,
    pub confirmations: Vec<ActionStatus>,
    pub latest_offer: Option<Offer>,
}

// ---------------------------------------------------------------------------
// Access checks
// ---------------------------------------------------------------------------

/// Load the caller's user row. Deactivated accounts are rejected.
pub async fn load_user(pool: &DbPool, user_id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(pool, user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Account is not active".into())))
}

pub async fn find_group(pool: &DbPool, group_id: DbId) -> AppResult<Group> {
    GroupRepo::find_by_id(pool, group_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Group",
            id: group_id,
        }))
}

/// Load a class and check that `admin` owns it.
pub async fn owned_class(pool: &DbPool, admin: &AuthUser, class_id: DbId) -> AppResult<Class> {
    let class = ClassRepo::find_by_id(pool, class_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Class",
            id: class_id,
        }))?;
    if class.admin_id != admin.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not manage this class".into(),
        )));
    }
    Ok(class)
}

/// Load a group for reading. Students may only read their own group.
pub async fn readable_group(pool: &DbPool, caller: &AuthUser, group_id: DbId) -> AppResult<Group> {
    let group = find_group(pool, group_id).await?;
    if !caller.is_admin() {
        let user = load_user(pool, caller.user_id).await?;
        ensure_member(&user, group_id)?;
    }
    Ok(group)
}

/// Load the caller and their group for a write.
///
/// The caller must be a member and the group must have been started.
async fn member_for_write(
    pool: &DbPool,
    caller: &AuthUser,
    group_id: DbId,
) -> AppResult<(User, Group)> {
    let user = load_user(pool, caller.user_id).await?;
    ensure_member(&user, group_id)?;
    let group = find_group(pool, group_id).await?;
    ensure_started(&group)?;
    Ok((user, group))
}

fn ensure_member(user: &User, group_id: DbId) -> AppResult<()> {
    if user.group_id != Some(group_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You are not a member of this group".into(),
        )));
    }
    Ok(())
}

fn ensure_started(group: &Group) -> AppResult<()> {
    if !group.started {
        return Err(AppError::Core(CoreError::Forbidden(
            "The group has not been started by the instructor".into(),
        )));
    }
    Ok(())
}

/// The candidate must exist and belong to the group's class.
async fn class_candidate(pool: &DbPool, group: &Group, candidate_id: DbId) -> AppResult<Candidate> {
    CandidateRepo::find_by_id(pool, candidate_id)
        .await?
        .filter(|c| c.class_id == group.class_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Candidate",
            id: candidate_id,
        }))
}

/// The candidate must be on the shortlist the group confirmed for
/// interviews. Only those candidates can be rated or made an offer.
async fn shortlisted_candidate<'e, E>(executor: E, group: &Group, candidate_id: DbId) -> AppResult<()>
where
    E: sqlx::PgExecutor<'e>,
{
    let shortlist = ShortlistRepo::checked_ids(executor, group.id).await?;
    if !shortlist.contains(&candidate_id) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Candidate {candidate_id} is not on the group's confirmed shortlist"
        ))));
    }
    Ok(())
}

async fn lock_group(conn: &mut PgConnection, group_id: DbId) -> AppResult<Group> {
    GroupRepo::lock_for_update(conn, group_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Group",
            id: group_id,
        }))
}

// ---------------------------------------------------------------------------
// Individual steps
// ---------------------------------------------------------------------------

/// Move the caller to the next step when that step is theirs to take alone.
pub async fn advance_individual(state: &AppState, caller: &AuthUser) -> AppResult<User> {
    let user = load_user(&state.pool, caller.user_id).await?;
    let group_id = user.group_id.ok_or_else(|| {
        AppError::Core(CoreError::Forbidden("You are not assigned to a group".into()))
    })?;
    ensure_started(&find_group(&state.pool, group_id).await?)?;

    let current = user.progress_step()?;
    let next = progress::advance_individual(current)?;
    let updated = UserRepo::advance_progress(&state.pool, user.id, current, next)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Conflict("Progress changed concurrently".into())))?;

    tracing::info!(user_id = user.id, from = %current, to = %next, "Student advanced");
    Ok(updated)
}

// ---------------------------------------------------------------------------
// Votes and ratings
// ---------------------------------------------------------------------------

pub fn tallies(counts: &[VoteCount]) -> BTreeMap<DbId, VoteTally> {
    let mut out: BTreeMap<DbId, VoteTally> = BTreeMap::new();
    for row in counts {
        match row.vote.parse::<VoteChoice>() {
            Ok(choice) => out.entry(row.candidate_id).or_default().record(choice, row.count),
            Err(_) => tracing::warn!(vote = %row.vote, "Unknown vote value in resume_votes"),
        }
    }
    out
}

pub async fn group_votes(pool: &DbPool, group_id: DbId) -> AppResult<Vec<CandidateVotes>> {
    let counts = VoteRepo::counts_by_group(pool, group_id).await?;
    Ok(tallies(&counts)
        .into_iter()
        .map(|(candidate_id, tally)| CandidateVotes {
            candidate_id,
            tally,
        })
        .collect())
}

/// Record the caller's vote on a resume and broadcast the new tally.
pub async fn cast_vote(
    state: &AppState,
    caller: &AuthUser,
    group_id: DbId,
    candidate_id: DbId,
    vote: VoteChoice,
) -> AppResult<CandidateVotes> {
    let (user, group) = member_for_write(&state.pool, caller, group_id).await?;
    progress::require_step(user.progress_step()?, ProgressStep::Res1)?;
    class_candidate(&state.pool, &group, candidate_id).await?;

    VoteRepo::upsert(&state.pool, user.id, group_id, candidate_id, vote).await?;
    let counts = VoteRepo::counts_for_candidate(&state.pool, group_id, candidate_id).await?;
    let tally = tallies(&counts)
        .remove(&candidate_id)
        .unwrap_or_default();

    tracing::debug!(user_id = user.id, group_id, candidate_id, vote = %vote, "Vote cast");
    state.event_bus.publish(
        PlatformEvent::for_group(event_names::VOTE_CAST, group_id, group.class_id)
            .with_actor(user.id)
            .with_field("candidate_id", candidate_id)
            .with_field("tally", tally),
    );

    Ok(CandidateVotes {
        candidate_id,
        tally,
    })
}

/// Record the caller's interview scores for a candidate.
pub async fn rate_candidate(
    state: &AppState,
    caller: &AuthUser,
    group_id: DbId,
    candidate_id: DbId,
    scores: InterviewScores,
) -> AppResult<InterviewRating> {
    scores.check()?;
    let (user, group) = member_for_write(&state.pool, caller, group_id).await?;
    progress::require_step(user.progress_step()?, ProgressStep::Interview)?;
    class_candidate(&state.pool, &group, candidate_id).await?;
    shortlisted_candidate(&state.pool, &group, candidate_id).await?;

    let rating = RatingRepo::upsert(
        &state.pool,
        &UpsertRating {
            user_id: user.id,
            group_id,
            candidate_id,
            scores,
        },
    )
    .await?;
    tracing::debug!(user_id = user.id, group_id, candidate_id, "Interview rated");
    Ok(rating)
}

// ---------------------------------------------------------------------------
// Shortlist
// ---------------------------------------------------------------------------

/// Check or uncheck a candidate on the group review page.
///
/// Any change to the selection withdraws pending `confirm_shortlist`
/// confirmations, since members confirmed a different list.
pub async fn toggle_shortlist(
    state: &AppState,
    caller: &AuthUser,
    group_id: DbId,
    candidate_id: DbId,
    checked: bool,
) -> AppResult<ShortlistState> {
    let (user, group) = member_for_write(&state.pool, caller, group_id).await?;
    let current_step = user.progress_step()?;
    progress::require_step(current_step, ProgressStep::Res2)?;
    if current_step > ProgressStep::Res2 {
        return Err(AppError::Core(CoreError::Conflict(
            "The shortlist has already been confirmed".into(),
        )));
    }
    class_candidate(&state.pool, &group, candidate_id).await?;

    let mut tx = state.pool.begin().await?;
    lock_group(&mut tx, group_id).await?;

    let current = ShortlistRepo::checked_ids(&mut *tx, group_id).await?;
    let changed = if checked {
        if !current.contains(&candidate_id) && current.len() >= SHORTLIST_SIZE {
            return Err(AppError::Core(CoreError::Validation(format!(
                "At most {SHORTLIST_SIZE} candidates can be shortlisted"
            ))));
        }
        ShortlistRepo::check(&mut *tx, group_id, candidate_id, user.id).await?
    } else {
        ShortlistRepo::uncheck(&mut *tx, group_id, candidate_id).await?
    };

    let cleared = if changed {
        ConfirmationRepo::clear_action(&mut *tx, group_id, GroupAction::ConfirmShortlist).await?
    } else {
        0
    };
    let candidate_ids = ShortlistRepo::checked_ids(&mut *tx, group_id).await?;
    let member_ids = UserRepo::list_member_ids(&mut *tx, group_id).await?;
    tx.commit().await?;

    if changed {
        tracing::debug!(user_id = user.id, group_id, candidate_id, checked, "Shortlist toggled");
        state.event_bus.publish(
            PlatformEvent::for_group(event_names::SHORTLIST_TOGGLED, group_id, group.class_id)
                .with_actor(user.id)
                .with_field("candidate_id", candidate_id)
                .with_field("checked", checked),
        );
    }
    if cleared > 0 {
        publish_confirmation(
            state,
            &group,
            user.id,
            GroupAction::ConfirmShortlist,
            &quorum::evaluate(&[], &member_ids),
        );
    }

    Ok(ShortlistState { candidate_ids })
}

// ---------------------------------------------------------------------------
// Confirmations
// ---------------------------------------------------------------------------

fn publish_confirmation(
    state: &AppState,
    group: &Group,
    actor: DbId,
    action: GroupAction,
    status: &QuorumStatus,
) {
    state.event_bus.publish(
        PlatformEvent::for_group(event_names::CONFIRMATION_CHANGED, group.id, group.class_id)
            .with_actor(actor)
            .with_field("action", action)
            .with_field("status", status),
    );
}

fn publish_progress(state: &AppState, group: &Group, actor: DbId, step: ProgressStep) {
    state.event_bus.publish(
        PlatformEvent::for_group(event_names::GROUP_PROGRESS_ADVANCED, group.id, group.class_id)
            .with_actor(actor)
            .with_field("step", step),
    );
}

/// Current quorum status for one action.
pub async fn confirmation_status(
    pool: &DbPool,
    group_id: DbId,
    action: GroupAction,
) -> AppResult<QuorumStatus> {
    let rows = ConfirmationRepo::list_for_action(pool, group_id, action).await?;
    let member_ids = UserRepo::list_member_ids(pool, group_id).await?;
    let confirmations: Vec<Confirmation> = rows.iter().map(Confirmation::from).collect();
    Ok(quorum::evaluate(&confirmations, &member_ids))
}

/// Resolve the canonical subject a member is confirming.
async fn confirm_subject(
    pool: &DbPool,
    group: &Group,
    request: &ConfirmRequest,
) -> AppResult<String> {
    match request.action {
        GroupAction::ConfirmShortlist => {
            let current = ShortlistRepo::checked_ids(pool, group.id).await?;
            let current_subject = quorum::shortlist_subject(&current)?;
            if request.candidate_ids.is_empty() {
                return Ok(current_subject);
            }
            let requested = quorum::shortlist_subject(&request.candidate_ids)?;
            if requested != current_subject {
                return Err(AppError::Core(CoreError::Conflict(
                    "The shortlist has changed; review it and confirm again".into(),
                )));
            }
            Ok(requested)
        }
        GroupAction::FinishInterviews => Ok(INTERVIEWS_SUBJECT.to_string()),
        GroupAction::SubmitOffer => {
            let candidate_id = request.candidate_id.ok_or_else(|| {
                AppError::Core(CoreError::Validation(
                    "candidate_id is required to submit an offer".into(),
                ))
            })?;
            class_candidate(pool, group, candidate_id).await?;
            shortlisted_candidate(pool, group, candidate_id).await?;
            Ok(quorum::offer_subject(candidate_id))
        }
    }
}

/// Record the caller's confirmation and apply the action once every member
/// agrees.
pub async fn confirm(
    state: &AppState,
    caller: &AuthUser,
    group_id: DbId,
    request: &ConfirmRequest,
) -> AppResult<ConfirmOutcome> {
    let action = request.action;
    let (user, group) = member_for_write(&state.pool, caller, group_id).await?;
    action.check_progress(user.progress_step()?)?;
    let subject = confirm_subject(&state.pool, &group, request).await?;

    let mut tx = state.pool.begin().await?;
    lock_group(&mut tx, group_id).await?;

    ConfirmationRepo::upsert(&mut *tx, group_id, action, user.id, &subject).await?;
    let rows = ConfirmationRepo::list_for_action(&mut *tx, group_id, action).await?;
    let member_ids = UserRepo::list_member_ids(&mut *tx, group_id).await?;
    let confirmations: Vec<Confirmation> = rows.iter().map(Confirmation::from).collect();
    let status = quorum::evaluate(&confirmations, &member_ids);

    let effect = if status.reached {
        // `reached` implies a subject.
        let agreed = status.subject.clone().unwrap_or_default();
        let effect = apply_effect(&mut tx, &group, user.id, action, &agreed).await?;
        ConfirmationRepo::clear_action(&mut *tx, group_id, action).await?;
        Some(effect)
    } else {
        None
    };
    tx.commit().await?;

    tracing::info!(
        user_id = user.id,
        group_id,
        action = %action,
        confirmed = status.confirmed,
        required = status.required,
        reached = status.reached,
        "Confirmation recorded"
    );

    publish_confirmation(state, &group, user.id, action, &status);
    if let Some(effect) = &effect {
        publish_effect(state, &group, user.id, effect);
    }

    Ok(ConfirmOutcome { status, effect })
}

fn publish_effect(state: &AppState, group: &Group, actor: DbId, effect: &ConfirmEffect) {
    match effect {
        ConfirmEffect::ProgressAdvanced { step } => publish_progress(state, group, actor, *step),
        ConfirmEffect::OfferSubmitted { offer } => {
            state.event_bus.publish(
                PlatformEvent::for_group(event_names::OFFER_SUBMITTED, group.id, group.class_id)
                    .with_actor(actor)
                    .with_field("offer_id", offer.id)
                    .with_field("candidate_id", offer.candidate_id),
            );
        }
    }
}

/// Re-evaluate pending confirmations after the group's membership changed.
///
/// Removing or deactivating a member shrinks the electorate, which can
/// complete a quorum nobody else is going to confirm again. Any action that
/// is now unanimous takes effect here, under the same group lock as
/// [`confirm`]. Returns the effects that were applied.
pub async fn settle_group(
    state: &AppState,
    actor: DbId,
    group_id: DbId,
) -> AppResult<Vec<ConfirmEffect>> {
    let group = find_group(&state.pool, group_id).await?;

    let mut tx = state.pool.begin().await?;
    lock_group(&mut tx, group_id).await?;
    let member_ids = UserRepo::list_member_ids(&mut *tx, group_id).await?;

    let mut statuses = Vec::new();
    let mut effects = Vec::new();
    for action in GroupAction::ALL {
        let rows = ConfirmationRepo::list_for_action(&mut *tx, group_id, action).await?;
        if rows.is_empty() {
            continue;
        }
        let confirmations: Vec<Confirmation> = rows.iter().map(Confirmation::from).collect();
        let status = quorum::evaluate(&confirmations, &member_ids);
        if status.reached {
            let agreed = status.subject.clone().unwrap_or_default();
            match apply_effect(&mut tx, &group, actor, action, &agreed).await {
                Ok(effect) => {
                    ConfirmationRepo::clear_action(&mut *tx, group_id, action).await?;
                    effects.push(effect);
                }
                Err(AppError::Core(CoreError::Conflict(reason))) => {
                    tracing::warn!(group_id, action = %action, %reason, "Quorum left pending");
                }
                Err(e) => return Err(e),
            }
        }
        statuses.push((action, status));
    }
    tx.commit().await?;

    for (action, status) in &statuses {
        publish_confirmation(state, &group, actor, *action, status);
    }
    for effect in &effects {
        publish_effect(state, &group, actor, effect);
    }
    if !effects.is_empty() {
        tracing::info!(group_id, applied = effects.len(), "Group quorum settled");
    }
    Ok(effects)
}

async fn apply_effect(
    conn: &mut PgConnection,
    group: &Group,
    actor: DbId,
    action: GroupAction,
    subject: &str,
) -> AppResult<ConfirmEffect> {
    if action == GroupAction::ConfirmShortlist {
        let current = ShortlistRepo::checked_ids(&mut *conn, group.id).await?;
        if quorum::shortlist_subject(&current)? != subject {
            return Err(AppError::Core(CoreError::Conflict(
                "The shortlist has changed; review it and confirm again".into(),
            )));
        }
    }

    match action.target_step() {
        Some(step) => advance_group(conn, group, step).await,
        None => submit_offer(conn, group, actor, subject).await,
    }
}

async fn submit_offer(
    conn: &mut PgConnection,
    group: &Group,
    actor: DbId,
    subject: &str,
) -> AppResult<ConfirmEffect> {
    let candidate_id = quorum::parse_offer_subject(subject)?;
    shortlisted_candidate(&mut *conn, group, candidate_id).await?;
    let latest = OfferRepo::latest_for_group(&mut *conn, group.id).await?;
    let latest_status = latest.as_ref().map(Offer::status).transpose()?;
    offer::ensure_can_submit(latest_status)?;

    let offer = OfferRepo::create(
        &mut *conn,
        &CreateOffer {
            group_id: group.id,
            class_id: group.class_id,
            candidate_id,
            submitted_by: actor,
        },
    )
    .await?;
    tracing::info!(group_id = group.id, offer_id = offer.id, candidate_id, "Offer submitted");
    Ok(ConfirmEffect::OfferSubmitted { offer })
}

async fn advance_group(
    conn: &mut PgConnection,
    group: &Group,
    step: ProgressStep,
) -> AppResult<ConfirmEffect> {
    let advanced = UserRepo::advance_group_progress(&mut *conn, group.id, step).await?;
    tracing::info!(group_id = group.id, step = %step, advanced, "Group advanced");
    Ok(ConfirmEffect::ProgressAdvanced { step })
}

/// Withdraw the caller's confirmation of an action.
pub async fn withdraw(
    state: &AppState,
    caller: &AuthUser,
    group_id: DbId,
    action: GroupAction,
) -> AppResult<QuorumStatus> {
    let (user, group) = member_for_write(&state.pool, caller, group_id).await?;

    let mut tx = state.pool.begin().await?;
    lock_group(&mut tx, group_id).await?;
    let removed = ConfirmationRepo::delete_for_user(&mut *tx, group_id, action, user.id).await?;
    let rows = ConfirmationRepo::list_for_action(&mut *tx, group_id, action).await?;
    let member_ids = UserRepo::list_member_ids(&mut *tx, group_id).await?;
    tx.commit().await?;

    let confirmations: Vec<Confirmation> = rows.iter().map(Confirmation::from).collect();
    let status = quorum::evaluate(&confirmations, &member_ids);
    if removed {
        tracing::info!(user_id = user.id, group_id, action = %action, "Confirmation withdrawn");
        publish_confirmation(state, &group, user.id, action, &status);
    }
    Ok(status)
}

// ---------------------------------------------------------------------------
// Admin actions
// ---------------------------------------------------------------------------

/// Accept or reject a pending offer.
///
/// Accepting moves every member of the group to the final step.
pub async fn decide_offer(
    state: &AppState,
    admin: &AuthUser,
    offer_id: DbId,
    decision: OfferStatus,
) -> AppResult<Offer> {
    let offer = OfferRepo::find_by_id(&state.pool, offer_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Offer",
            id: offer_id,
        }))?;
    owned_class(&state.pool, admin, offer.class_id).await?;
    let group = find_group(&state.pool, offer.group_id).await?;

    let mut tx = state.pool.begin().await?;
    let locked = OfferRepo::lock_for_update(&mut tx, offer_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Offer",
            id: offer_id,
        }))?;
    let status = offer::decide(locked.status()?, decision)?;
    let decided = OfferRepo::set_status(&mut *tx, offer_id, status, admin.user_id).await?;
    if status == OfferStatus::Accepted {
        UserRepo::advance_group_progress(&mut *tx, group.id, ProgressStep::Employer).await?;
    }
    tx.commit().await?;

    tracing::info!(
        admin_id = admin.user_id,
        offer_id,
        group_id = group.id,
        status = %status,
        "Offer decided"
    );
    state.event_bus.publish(
        PlatformEvent::for_group(event_names::OFFER_DECIDED, group.id, group.class_id)
            .with_actor(admin.user_id)
            .with_field("offer_id", offer_id)
            .with_field("candidate_id", decided.candidate_id)
            .with_field("status", status),
    );
    if status == OfferStatus::Accepted {
        publish_progress(state, &group, admin.user_id, ProgressStep::Employer);
    }
    Ok(decided)
}

/// Let a group begin the simulation. Starting twice is a no-op.
pub async fn start_group(state: &AppState, admin: &AuthUser, group_id: DbId) -> AppResult<Group> {
    let group = find_group(&state.pool, group_id).await?;
    owned_class(&state.pool, admin, group.class_id).await?;

    match GroupRepo::start(&state.pool, group_id).await? {
        Some(started) => {
            tracing::info!(admin_id = admin.user_id, group_id, "Group started");
            state.event_bus.publish(
                PlatformEvent::for_group(event_names::GROUP_STARTED, group_id, group.class_id)
                    .with_actor(admin.user_id),
            );
            Ok(started)
        }
        None => find_group(&state.pool, group_id).await,
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Full group state, used by clients to reconcile after missed messages.
pub async fn group_snapshot(pool: &DbPool, group_id: DbId) -> AppResult<GroupSnapshot> {
    let group = find_group(pool, group_id).await?;
    let members = UserRepo::list_group_members(pool, group_id).await?;
    let shortlist = ShortlistRepo::checked_ids(pool, group_id).await?;
    let votes = group_votes(pool, group_id).await?;

    let mut confirmations = Vec::with_capacity(GroupAction::ALL.len());
    for action in GroupAction::ALL {
        confirmations.push(ActionStatus {
            action,
            status: confirmation_status(pool, group_id, action).await?,
        });
    }
    let latest_offer = OfferRepo::latest_for_group(pool, group_id).await?;

    Ok(GroupSnapshot {
        group,
        members,
        shortlist,
        votes,
        confirmations,
        latest_offer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(candidate_id: DbId, vote: &str, count: i64) -> VoteCount {
        VoteCount {
            candidate_id,
            vote: vote.to_string(),
            count,
        }
    }

    #[test]
    fn tallies_group_counts_by_candidate() {
        let out = tallies(&[
            count(1, "yes", 2),
            count(1, "no", 1),
            count(2, "unanswered", 3),
        ]);
        assert_eq!(
            out[&1],
            VoteTally {
                yes: 2,
                no: 1,
                unanswered: 0
            }
        );
        assert_eq!(out[&2].unanswered, 3);
        assert_eq!(out.len(), 2);
    }
}
