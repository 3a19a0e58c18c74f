//! Resume votes and interview ratings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::DbId;

/// Lowest allowed interview score.
pub const MIN_SCORE: i16 = 1;

/// Highest allowed interview score.
pub const MAX_SCORE: i16 = 10;

/// A student's verdict on one resume during individual review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteChoice {
    Yes,
    No,
    Unanswered,
}

impl VoteChoice {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteChoice::Yes => "yes",
            VoteChoice::No => "no",
            VoteChoice::Unanswered => "unanswered",
        }
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteChoice {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(VoteChoice::Yes),
            "no" => Ok(VoteChoice::No),
            "unanswered" => Ok(VoteChoice::Unanswered),
            other => Err(CoreError::Validation(format!(
                "Invalid vote '{other}'. Must be one of: yes, no, unanswered"
            ))),
        }
    }
}

/// Vote counts for one candidate within a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub yes: i64,
    pub no: i64,
    pub unanswered: i64,
}

impl VoteTally {
    /// Add `count` votes of one kind.
    pub fn record(&mut self, choice: VoteChoice, count: i64) {
        match choice {
            VoteChoice::Yes => self.yes += count,
            VoteChoice::No => self.no += count,
            VoteChoice::Unanswered => self.unanswered += count,
        }
    }

    pub fn total(&self) -> i64 {
        self.yes + self.no + self.unanswered
    }
}

/// One student's scores for one interviewed candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct InterviewScores {
    #[validate(range(min = 1, max = 10))]
    pub overall: i16,
    #[validate(range(min = 1, max = 10))]
    pub professional_presence: i16,
    #[validate(range(min = 1, max = 10))]
    pub communication: i16,
    #[validate(range(min = 1, max = 10))]
    pub personal_quality: i16,
}

impl InterviewScores {
    /// Validate every score, mapping failures to [`CoreError::Validation`].
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate().map_err(|e| {
            CoreError::Validation(format!(
                "Interview scores must be between {MIN_SCORE} and {MAX_SCORE}: {e}"
            ))
        })
    }
}

/// Average scores for one candidate across the group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub candidate_id: DbId,
    pub ratings: usize,
    pub overall: f64,
    pub professional_presence: f64,
    pub communication: f64,
    pub personal_quality: f64,
}

impl RatingSummary {
    /// Average the given scores. Returns `None` when there are none.
    pub fn from_scores(candidate_id: DbId, scores: &[InterviewScores]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        let n = scores.len() as f64;
        let avg = |f: fn(&InterviewScores) -> i16| {
            scores.iter().map(|s| f64::from(f(s))).sum::<f64>() / n
        };
        Some(Self {
            candidate_id,
            ratings: scores.len(),
            overall: avg(|s| s.overall),
            professional_presence: avg(|s| s.professional_presence),
            communication: avg(|s| s.communication),
            personal_quality: avg(|s| s.personal_quality),
        })
    }
}
