use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Revocation record for a token invalidated before its natural expiry.
///
/// A row exists only for explicitly revoked tokens; absence means the token
/// was never revoked. Records are written once and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TokenRevocation {
    pub id: Uuid,
    /// SHA-256 hex of the token as issued.
    pub token_hash: String,
    pub username: String,
    pub valid: bool,
    pub revoked_at: DateTime<Utc>,
    /// When the token would have expired on its own; past this point the
    /// record can be garbage-collected.
    pub expires_at: DateTime<Utc>,
}

impl TokenRevocation {
    /// Check if the revoked token has also expired on its own.
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}
