//! Event type names published on the platform event bus.
//!
//! The realtime router matches on these to pick the socket message and the
//! rooms it goes to. They are also the `event_type` column of the `events`
//! table.

pub const GROUP_STARTED: &str = "group.started";
pub const GROUP_PROGRESS_ADVANCED: &str = "group.progress_advanced";
pub const VOTE_CAST: &str = "vote.cast";
pub const SHORTLIST_TOGGLED: &str = "shortlist.toggled";
pub const CONFIRMATION_CHANGED: &str = "confirmation.changed";
pub const OFFER_SUBMITTED: &str = "offer.submitted";
pub const OFFER_DECIDED: &str = "offer.decided";
pub const POPUP_SENT: &str = "popup.sent";

/// Source entity kinds attached to events.
pub mod entities {
    pub const GROUP: &str = "group";
    pub const OFFER: &str = "offer";
    pub const CLASS: &str = "class";
}
