//! Group confirmation quorum.
//!
//! Some steps are left as a group: every member must confirm the same
//! subject (a candidate shortlist, the end of interviews, the candidate to
//! make an offer to) before the action takes effect. Each member holds at
//! most one confirmation per action; confirming a different subject
//! replaces the earlier one.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::progress::ProgressStep;
use crate::types::DbId;

/// Maximum number of candidates a group may shortlist for interviews.
pub const SHORTLIST_SIZE: usize = 4;

/// Subject used for the `finish_interviews` action.
pub const INTERVIEWS_SUBJECT: &str = "interviews";

/// An action that needs every group member's confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupAction {
    /// Lock in the interview shortlist chosen on the group review page.
    ConfirmShortlist,
    /// Agree that every interview has been watched and rated.
    FinishInterviews,
    /// Submit the team offer for admin approval.
    SubmitOffer,
}

impl GroupAction {
    pub const ALL: [GroupAction; 3] = [
        GroupAction::ConfirmShortlist,
        GroupAction::FinishInterviews,
        GroupAction::SubmitOffer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GroupAction::ConfirmShortlist => "confirm_shortlist",
            GroupAction::FinishInterviews => "finish_interviews",
            GroupAction::SubmitOffer => "submit_offer",
        }
    }

    /// Step every member must have reached to confirm this action.
    pub fn required_step(self) -> ProgressStep {
        match self {
            GroupAction::ConfirmShortlist => ProgressStep::Res2,
            GroupAction::FinishInterviews => ProgressStep::Interview,
            GroupAction::SubmitOffer => ProgressStep::Offer,
        }
    }

    /// Step the group moves to once quorum is reached.
    ///
    /// `None` for `submit_offer`: the group only moves on after an admin
    /// accepts the offer.
    pub fn target_step(self) -> Option<ProgressStep> {
        match self {
            GroupAction::ConfirmShortlist => Some(ProgressStep::Interview),
            GroupAction::FinishInterviews => Some(ProgressStep::Offer),
            GroupAction::SubmitOffer => None,
        }
    }

    /// Check a member's progress before they confirm this action.
    ///
    /// Members behind the required step are `Forbidden`; members past it
    /// belong to a group that already completed the action (`Conflict`).
    pub fn check_progress(self, progress: ProgressStep) -> Result<(), CoreError> {
        let required = self.required_step();
        if progress < required {
            return Err(CoreError::Forbidden(format!(
                "'{self}' requires progress '{required}', currently at '{progress}'"
            )));
        }
        if progress > required {
            return Err(CoreError::Conflict(format!(
                "Your group has already completed '{self}'"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for GroupAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GroupAction::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid action '{s}'. Must be one of: {}",
                    GroupAction::ALL.map(GroupAction::as_str).join(", ")
                ))
            })
    }
}

/// One member's confirmation of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub user_id: DbId,
    pub subject: String,
}

/// Result of evaluating a group's confirmations for one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumStatus {
    /// Number of current group members.
    pub required: usize,
    /// Members confirming the leading subject.
    pub confirmed: usize,
    /// The subject most members agree on, if anyone has confirmed.
    pub subject: Option<String>,
    pub reached: bool,
}

/// Evaluate confirmations against the current member list.
///
/// Confirmations from users who are no longer members are ignored. When
/// members disagree, the subject with the most confirmations leads; ties go
/// to the lexicographically smallest subject so the result is stable.
pub fn evaluate(confirmations: &[Confirmation], member_ids: &[DbId]) -> QuorumStatus {
    let members: HashSet<DbId> = member_ids.iter().copied().collect();

    // Last write wins per user.
    let mut latest: BTreeMap<DbId, &str> = BTreeMap::new();
    for c in confirmations.iter().filter(|c| members.contains(&c.user_id)) {
        latest.insert(c.user_id, c.subject.as_str());
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for subject in latest.values() {
        *counts.entry(*subject).or_default() += 1;
    }

    let mut leader: Option<(&str, usize)> = None;
    for (subject, count) in &counts {
        if leader.map_or(true, |(_, best)| *count > best) {
            leader = Some((*subject, *count));
        }
    }

    let required = members.len();
    let (subject, confirmed) = match leader {
        Some((s, n)) => (Some(s.to_string()), n),
        None => (None, 0),
    };

    QuorumStatus {
        required,
        confirmed,
        subject,
        reached: required > 0 && confirmed == required,
    }
}

/// Canonical subject for a shortlist: sorted, de-duplicated, comma-joined ids.
pub fn shortlist_subject(candidate_ids: &[DbId]) -> Result<String, CoreError> {
    let mut ids: Vec<DbId> = candidate_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    if ids.is_empty() {
        return Err(CoreError::Validation(
            "A shortlist must contain at least one candidate".into(),
        ));
    }
    if ids.len() > SHORTLIST_SIZE {
        return Err(CoreError::Validation(format!(
            "A shortlist may contain at most {SHORTLIST_SIZE} candidates, got {}",
            ids.len()
        )));
    }

    Ok(ids
        .iter()
        .map(DbId::to_string)
        .collect::<Vec<_>>()
        .join(","))
}

/// Subject for an offer confirmation: the nominated candidate id.
pub fn offer_subject(candidate_id: DbId) -> String {
    candidate_id.to_string()
}

pub fn parse_offer_subject(subject: &str) -> Result<DbId, CoreError> {
    subject
        .parse()
        .map_err(|_| CoreError::Validation(format!("Malformed offer subject '{subject}'")))
}
