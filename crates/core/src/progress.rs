//! Progress steps and the route gate.
//!
//! A student's `progress` column holds one of the step names below. Steps
//! are totally ordered; reaching a step unlocks its route and every route
//! before it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::quorum::GroupAction;

/// One stage of the hiring simulation, in workflow order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStep {
    #[default]
    JobDescription,
    #[serde(rename = "res_1")]
    Res1,
    #[serde(rename = "res_2")]
    Res2,
    Interview,
    Offer,
    Employer,
}

/// How a student moves past a given step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceMode {
    /// The student advances on their own.
    Individual,
    /// Every group member must confirm the action.
    GroupQuorum(GroupAction),
    /// An admin must accept the group's offer.
    AdminApproval,
    /// Last step; nothing follows.
    Terminal,
}

impl ProgressStep {
    pub const ALL: [ProgressStep; 6] = [
        ProgressStep::JobDescription,
        ProgressStep::Res1,
        ProgressStep::Res2,
        ProgressStep::Interview,
        ProgressStep::Offer,
        ProgressStep::Employer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProgressStep::JobDescription => "job_description",
            ProgressStep::Res1 => "res_1",
            ProgressStep::Res2 => "res_2",
            ProgressStep::Interview => "interview",
            ProgressStep::Offer => "offer",
            ProgressStep::Employer => "employer",
        }
    }

    /// Client route unlocked by this step.
    pub fn route(self) -> &'static str {
        match self {
            ProgressStep::JobDescription => "/jobdes",
            ProgressStep::Res1 => "/res-review",
            ProgressStep::Res2 => "/res-review-group",
            ProgressStep::Interview => "/interview-stage",
            ProgressStep::Offer => "/makeOffer",
            ProgressStep::Employer => "/employerPannel",
        }
    }

    pub fn next(self) -> Option<ProgressStep> {
        let idx = Self::ALL.iter().position(|s| *s == self)?;
        Self::ALL.get(idx + 1).copied()
    }

    pub fn advance_mode(self) -> AdvanceMode {
        match self {
            ProgressStep::JobDescription | ProgressStep::Res1 => AdvanceMode::Individual,
            ProgressStep::Res2 => AdvanceMode::GroupQuorum(GroupAction::ConfirmShortlist),
            ProgressStep::Interview => AdvanceMode::GroupQuorum(GroupAction::FinishInterviews),
            ProgressStep::Offer => AdvanceMode::AdminApproval,
            ProgressStep::Employer => AdvanceMode::Terminal,
        }
    }
}

impl fmt::Display for ProgressStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProgressStep {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProgressStep::ALL
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid progress step '{s}'. Must be one of: {}",
                    ProgressStep::ALL.map(ProgressStep::as_str).join(", ")
                ))
            })
    }
}

/// Find the step that gates a client route, if any.
pub fn step_for_route(route: &str) -> Option<ProgressStep> {
    ProgressStep::ALL.into_iter().find(|step| step.route() == route)
}

/// Every step at or before `progress`.
pub fn unlocked_steps(progress: ProgressStep) -> Vec<ProgressStep> {
    ProgressStep::ALL
        .into_iter()
        .filter(|step| *step <= progress)
        .collect()
}

/// Whether a student at `progress` may open `route`.
///
/// Routes that no step gates are always accessible.
pub fn can_access_route(progress: ProgressStep, route: &str) -> bool {
    match step_for_route(route) {
        Some(step) => step <= progress,
        None => true,
    }
}

/// Reject the request unless `progress` has reached `required`.
pub fn require_step(progress: ProgressStep, required: ProgressStep) -> Result<(), CoreError> {
    if progress >= required {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "This action requires progress '{required}', current progress is '{progress}'"
        )))
    }
}

/// Move a student to the next step when the current one is self-paced.
pub fn advance_individual(current: ProgressStep) -> Result<ProgressStep, CoreError> {
    match current.advance_mode() {
        AdvanceMode::Individual => current.next().ok_or_else(|| {
            CoreError::Internal(format!("Step '{current}' has no successor"))
        }),
        AdvanceMode::GroupQuorum(action) => Err(CoreError::Conflict(format!(
            "Leaving '{current}' requires every group member to confirm '{action}'"
        ))),
        AdvanceMode::AdminApproval => Err(CoreError::Conflict(format!(
            "Leaving '{current}' requires an accepted offer"
        ))),
        AdvanceMode::Terminal => Err(CoreError::Conflict(format!(
            "'{current}' is the final step"
        ))),
    }
}
