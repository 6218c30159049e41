use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = u32;
pub type ChirpId = u32;

/// A registered account as persisted in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub hashed_password: String,
    #[serde(default)]
    pub is_chirpy_red: bool,
}

/// A short post. The body stored here has already been length-checked and redacted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chirp {
    pub id: ChirpId,
    pub author_id: UserId,
    pub body: String,
}

/// A refresh token that must no longer be honoured for rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationRecord {
    pub token: String,
    #[serde(default)]
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RevocationRecord {
    pub fn new(token: impl Into<String>, revoked_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            revoked_at: Some(revoked_at),
        }
    }

    /// A record without a timestamp, or with one at or before the Unix epoch,
    /// does not count as a revocation.
    pub fn is_active(&self) -> bool {
        matches!(self.revoked_at, Some(at) if at.timestamp() > 0)
    }
}
