//! Offer status values and the admin decision state machine.
//!
//! A group nominates one candidate at a time. The offer starts `pending`
//! and an admin moves it to `accepted` or `rejected`. After a rejection the
//! group may nominate again; after an acceptance it may not.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
}

impl OfferStatus {
    pub const ALL: [OfferStatus; 3] = [
        OfferStatus::Pending,
        OfferStatus::Accepted,
        OfferStatus::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OfferStatus::Pending => "pending",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Rejected => "rejected",
        }
    }

    pub fn is_final(self) -> bool {
        !matches!(self, OfferStatus::Pending)
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfferStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OfferStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid offer status '{s}'. Must be one of: pending, accepted, rejected"
                ))
            })
    }
}

/// Validate an admin decision on an offer currently in `from`.
///
/// Only `pending -> accepted | rejected` is a transition; everything else
/// conflicts with the offer's current state.
pub fn decide(from: OfferStatus, to: OfferStatus) -> Result<OfferStatus, CoreError> {
    match (from, to) {
        (OfferStatus::Pending, OfferStatus::Accepted | OfferStatus::Rejected) => Ok(to),
        (OfferStatus::Pending, OfferStatus::Pending) => Err(CoreError::Conflict(
            "Offer is already pending; decide 'accepted' or 'rejected'".into(),
        )),
        (from, _) => Err(CoreError::Conflict(format!(
            "Offer has already been {from}"
        ))),
    }
}

/// Check whether a group may submit a new offer given its latest one.
pub fn ensure_can_submit(latest: Option<OfferStatus>) -> Result<(), CoreError> {
    match latest {
        None | Some(OfferStatus::Rejected) => Ok(()),
        Some(OfferStatus::Pending) => Err(CoreError::Conflict(
            "The group already has an offer awaiting approval".into(),
        )),
        Some(OfferStatus::Accepted) => Err(CoreError::Conflict(
            "The group's offer has already been accepted".into(),
        )),
    }
}
