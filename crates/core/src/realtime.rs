//! Realtime socket protocol.
//!
//! Messages are JSON objects with an internally-tagged `"type"` field so the
//! browser can dispatch on a string. Only `presence.*` messages travel from
//! client to server; everything else is pushed by the server.

use serde::{Deserialize, Serialize};

use crate::offer::OfferStatus;
use crate::progress::{step_for_route, ProgressStep};
use crate::quorum::{GroupAction, QuorumStatus};
use crate::types::DbId;
use crate::vote::VoteTally;

/// Pages a client may report presence on, besides the gated step routes.
pub const UNGATED_PAGES: &[&str] = &["/dashboard", "/notes", "/advisor"];

/// Socket rooms a message can be addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Room {
    /// Every connection belonging to members of a group.
    Group(DbId),
    /// Admin connections watching a class.
    Class(DbId),
    /// Every student connection enrolled in a class, across all its groups.
    ClassStudents(DbId),
    /// Every connection of one user.
    User(DbId),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum RealtimeMessage {
    /// Client sends: user opened a page.
    #[serde(rename = "presence.join")]
    PresenceJoin { page: String },

    /// Client sends: user left their current page.
    #[serde(rename = "presence.leave")]
    PresenceLeave,

    /// Server broadcasts: who in a group is on which page.
    #[serde(rename = "presence.update")]
    PresenceUpdate {
        group_id: DbId,
        members: Vec<PresenceEntry>,
    },

    /// Server pushes: instructor popup.
    #[serde(rename = "popup")]
    Popup { headline: String, message: String },

    #[serde(rename = "group.started")]
    GroupStarted { group_id: DbId },

    #[serde(rename = "votes.updated")]
    VotesUpdated {
        group_id: DbId,
        candidate_id: DbId,
        tally: VoteTally,
    },

    #[serde(rename = "shortlist.updated")]
    ShortlistUpdated {
        group_id: DbId,
        candidate_id: DbId,
        checked: bool,
        user_id: DbId,
    },

    #[serde(rename = "confirmation.updated")]
    ConfirmationUpdated {
        group_id: DbId,
        action: GroupAction,
        status: QuorumStatus,
    },

    #[serde(rename = "progress.advanced")]
    ProgressAdvanced { group_id: DbId, step: ProgressStep },

    #[serde(rename = "offer.submitted")]
    OfferSubmitted {
        group_id: DbId,
        offer_id: DbId,
        candidate_id: DbId,
    },

    #[serde(rename = "offer.decided")]
    OfferDecided {
        group_id: DbId,
        offer_id: DbId,
        status: OfferStatus,
    },

    /// Server sends to one connection: its last frame was rejected.
    #[serde(rename = "error")]
    Error { message: String },
}

/// A group member's current page in a presence update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresenceEntry {
    pub user_id: DbId,
    pub page: Option<String>,
}

impl RealtimeMessage {
    /// Whether clients are allowed to send this variant.
    pub fn is_client_message(&self) -> bool {
        matches!(
            self,
            RealtimeMessage::PresenceJoin { .. } | RealtimeMessage::PresenceLeave
        )
    }

    /// Serialize to the JSON text frame sent on the wire.
    pub fn to_json(&self) -> String {
        // Every variant is built from plain data; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{\"type\":\"error\"}"))
    }
}

/// Validate a page reported in `presence.join`.
pub fn validate_page(page: &str) -> Result<(), String> {
    if step_for_route(page).is_some() || UNGATED_PAGES.contains(&page) {
        Ok(())
    } else {
        Err(format!("Unknown page '{page}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence_join_parses_from_client_json() {
        let msg: RealtimeMessage =
            serde_json::from_str(r#"{"type":"presence.join","page":"/res-review"}"#).unwrap();
        assert_eq!(
            msg,
            RealtimeMessage::PresenceJoin {
                page: "/res-review".into()
            }
        );
        assert!(msg.is_client_message());
    }

    #[test]
    fn presence_leave_has_no_fields() {
        let msg: RealtimeMessage = serde_json::from_str(r#"{"type":"presence.leave"}"#).unwrap();
        assert_eq!(msg, RealtimeMessage::PresenceLeave);
    }

    #[test]
    fn server_messages_are_not_client_messages() {
        let msg = RealtimeMessage::GroupStarted { group_id: 1 };
        assert!(!msg.is_client_message());
    }

    #[test]
    fn offer_decided_serializes_with_tag() {
        let json = RealtimeMessage::OfferDecided {
            group_id: 2,
            offer_id: 9,
            status: OfferStatus::Accepted,
        }
        .to_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "offer.decided");
        assert_eq!(value["status"], "accepted");
        assert_eq!(value["offer_id"], 9);
    }

    #[test]
    fn confirmation_update_carries_action_name() {
        let json = RealtimeMessage::ConfirmationUpdated {
            group_id: 1,
            action: GroupAction::ConfirmShortlist,
            status: QuorumStatus {
                required: 3,
                confirmed: 1,
                subject: Some("1,2".into()),
                reached: false,
            },
        }
        .to_json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["action"], "confirm_shortlist");
        assert_eq!(value["status"]["confirmed"], 1);
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(serde_json::from_str::<RealtimeMessage>(r#"{"type":"nope"}"#).is_err());
    }

    #[test]
    fn page_validation() {
        assert!(validate_page("/interview-stage").is_ok());
        assert!(validate_page("/notes").is_ok());
        assert!(validate_page("/somewhere").is_err());
    }
}
