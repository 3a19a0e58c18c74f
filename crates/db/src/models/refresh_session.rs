//! Refresh-token sessions.

use nuhire_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// One issued refresh token. The plaintext token is never stored.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshSession {
    pub id: DbId,
    pub user_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
    /// Set when the token is rotated or revoked; a spent token is never
    /// accepted again.
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RefreshSession {
    /// Whether the token can still be exchanged at `now`.
    pub fn is_live(&self, now: Timestamp) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

pub struct NewRefreshSession {
    pub user_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
}
