//! Event bus to WebSocket fan-out.
//!
//! [`RealtimeRouter`] subscribes to the platform event bus, turns each
//! event into a [`RealtimeMessage`] and pushes it to the rooms that should
//! see it: the group's members plus the admins watching its class.

use std::sync::Arc;

use nuhire_core::event_names;
use nuhire_core::offer::OfferStatus;
use nuhire_core::progress::ProgressStep;
use nuhire_core::quorum::{GroupAction, QuorumStatus};
use nuhire_core::realtime::{RealtimeMessage, Room};
use nuhire_core::types::DbId;
use nuhire_core::vote::VoteTally;
use nuhire_events::PlatformEvent;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::broadcast;

use crate::ws::WsManager;

pub struct RealtimeRouter {
    ws_manager: Arc<WsManager>,
}

impl RealtimeRouter {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run until the bus closes.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.route_event(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Realtime router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, realtime router shutting down");
                    break;
                }
            }
        }
    }

    async fn route_event(&self, event: &PlatformEvent) {
        match translate(event) {
            Ok(Some((rooms, message))) => {
                let sent = self.ws_manager.send_to_rooms(&rooms, &message).await;
                tracing::debug!(event_type = %event.event_type, sent, "Realtime message sent");
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(
                    error = %e,
                    event_type = %event.event_type,
                    "Malformed event payload, not forwarded"
                );
            }
        }
    }
}

#[derive(Deserialize)]
struct GroupScope {
    group_id: DbId,
    class_id: DbId,
}

#[derive(Deserialize)]
struct ProgressPayload {
    step: ProgressStep,
}

#[derive(Deserialize)]
struct VotePayload {
    candidate_id: DbId,
    tally: VoteTally,
}

#[derive(Deserialize)]
struct ShortlistPayload {
    candidate_id: DbId,
    checked: bool,
}

#[derive(Deserialize)]
struct ConfirmationPayload {
    action: GroupAction,
    status: QuorumStatus,
}

#[derive(Deserialize)]
struct OfferSubmittedPayload {
    offer_id: DbId,
    candidate_id: DbId,
}

#[derive(Deserialize)]
struct OfferDecidedPayload {
    offer_id: DbId,
    status: OfferStatus,
}

#[derive(Deserialize)]
struct PopupPayload {
    class_id: DbId,
    #[serde(default)]
    group_ids: Vec<DbId>,
    headline: String,
    message: String,
}

fn payload<T: DeserializeOwned>(event: &PlatformEvent) -> Result<T, serde_json::Error> {
    T::deserialize(&event.payload)
}

/// Map an event to its target rooms and socket message.
///
/// `Ok(None)` for event types that have no realtime counterpart.
pub fn translate(
    event: &PlatformEvent,
) -> Result<Option<(Vec<Room>, RealtimeMessage)>, serde_json::Error> {
    if event.event_type == event_names::POPUP_SENT {
        let p: PopupPayload = payload(event)?;
        let rooms = if p.group_ids.is_empty() {
            vec![Room::ClassStudents(p.class_id)]
        } else {
            p.group_ids.into_iter().map(Room::Group).collect()
        };
        let message = RealtimeMessage::Popup {
            headline: p.headline,
            message: p.message,
        };
        return Ok(Some((rooms, message)));
    }

    let scope: GroupScope = match event.event_type.as_str() {
        event_names::GROUP_STARTED
        | event_names::GROUP_PROGRESS_ADVANCED
        | event_names::VOTE_CAST
        | event_names::SHORTLIST_TOGGLED
        | event_names::CONFIRMATION_CHANGED
        | event_names::OFFER_SUBMITTED
        | event_names::OFFER_DECIDED => payload(event)?,
        _ => return Ok(None),
    };
    let group_id = scope.group_id;

    let message = match event.event_type.as_str() {
        event_names::GROUP_STARTED => RealtimeMessage::GroupStarted { group_id },
        event_names::GROUP_PROGRESS_ADVANCED => {
            let p: ProgressPayload = payload(event)?;
            RealtimeMessage::ProgressAdvanced {
                group_id,
                step: p.step,
            }
        }
        event_names::VOTE_CAST => {
            let p: VotePayload = payload(event)?;
            RealtimeMessage::VotesUpdated {
                group_id,
                candidate_id: p.candidate_id,
                tally: p.tally,
            }
        }
        event_names::SHORTLIST_TOGGLED => {
            let p: ShortlistPayload = payload(event)?;
            RealtimeMessage::ShortlistUpdated {
                group_id,
                candidate_id: p.candidate_id,
                checked: p.checked,
                user_id: event.actor_user_id.unwrap_or_default(),
            }
        }
        event_names::CONFIRMATION_CHANGED => {
            let p: ConfirmationPayload = payload(event)?;
            RealtimeMessage::ConfirmationUpdated {
                group_id,
                action: p.action,
                status: p.status,
            }
        }
        event_names::OFFER_SUBMITTED => {
            let p: OfferSubmittedPayload = payload(event)?;
            RealtimeMessage::OfferSubmitted {
                group_id,
                offer_id: p.offer_id,
                candidate_id: p.candidate_id,
            }
        }
        event_names::OFFER_DECIDED => {
            let p: OfferDecidedPayload = payload(event)?;
            RealtimeMessage::OfferDecided {
                group_id,
                offer_id: p.offer_id,
                status: p.status,
            }
        }
        _ => return Ok(None),
    };

    Ok(Some((
        vec![Room::Group(group_id), Room::Class(scope.class_id)],
        message,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_events_go_to_group_and_class_rooms() {
        let event = PlatformEvent::for_group(event_names::GROUP_STARTED, 4, 2);
        let (rooms, message) = translate(&event).unwrap().unwrap();
        assert_eq!(rooms, vec![Room::Group(4), Room::Class(2)]);
        assert_eq!(message, RealtimeMessage::GroupStarted { group_id: 4 });
    }

    #[test]
    fn vote_event_carries_tally() {
        let tally = VoteTally {
            yes: 2,
            no: 1,
            unanswered: 0,
        };
        let event = PlatformEvent::for_group(event_names::VOTE_CAST, 1, 1)
            .with_field("candidate_id", 9)
            .with_field("tally", tally);
        let (_, message) = translate(&event).unwrap().unwrap();
        assert_eq!(
            message,
            RealtimeMessage::VotesUpdated {
                group_id: 1,
                candidate_id: 9,
                tally
            }
        );
    }

    #[test]
    fn shortlist_event_reports_acting_user() {
        let event = PlatformEvent::for_group(event_names::SHORTLIST_TOGGLED, 1, 1)
            .with_actor(12)
            .with_field("candidate_id", 3)
            .with_field("checked", true);
        let (_, message) = translate(&event).unwrap().unwrap();
        assert_eq!(
            message,
            RealtimeMessage::ShortlistUpdated {
                group_id: 1,
                candidate_id: 3,
                checked: true,
                user_id: 12
            }
        );
    }

    #[test]
    fn offer_decision_translates_status() {
        let event = PlatformEvent::for_group(event_names::OFFER_DECIDED, 5, 2)
            .with_field("offer_id", 8)
            .with_field("status", OfferStatus::Rejected);
        let (_, message) = translate(&event).unwrap().unwrap();
        assert_eq!(
            message,
            RealtimeMessage::OfferDecided {
                group_id: 5,
                offer_id: 8,
                status: OfferStatus::Rejected
            }
        );
    }

    #[test]
    fn popup_without_groups_targets_whole_class() {
        let event = PlatformEvent::new(event_names::POPUP_SENT).with_payload(serde_json::json!({
            "class_id": 3,
            "headline": "Time check",
            "message": "Ten minutes left"
        }));
        let (rooms, message) = translate(&event).unwrap().unwrap();
        assert_eq!(rooms, vec![Room::ClassStudents(3)]);
        assert_eq!(
            message,
            RealtimeMessage::Popup {
                headline: "Time check".into(),
                message: "Ten minutes left".into()
            }
        );
    }

    #[test]
    fn popup_with_groups_targets_those_groups() {
        let event = PlatformEvent::new(event_names::POPUP_SENT).with_payload(serde_json::json!({
            "class_id": 3,
            "group_ids": [7, 9],
            "headline": "h",
            "message": "m"
        }));
        let (rooms, _) = translate(&event).unwrap().unwrap();
        assert_eq!(rooms, vec![Room::Group(7), Room::Group(9)]);
    }

    #[test]
    fn unknown_events_are_ignored() {
        assert!(translate(&PlatformEvent::new("class.created")).unwrap().is_none());
    }

    #[test]
    fn missing_routing_ids_are_errors() {
        assert!(translate(&PlatformEvent::new(event_names::GROUP_STARTED)).is_err());
    }
}
