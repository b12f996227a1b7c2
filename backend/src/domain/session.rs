//! Server-tracked sessions referenced by an opaque cookie token.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::rngs::OsRng;

use super::UserId;

/// Bytes of entropy in a session token.
pub const SESSION_ID_BYTES: usize = 32;

/// Returned when a presented token is not a well-formed session id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("session id must be {expected} lowercase hex characters")]
pub struct SessionIdValidationError {
    expected: usize,
}

/// Unguessable session token: 256 random bits, hex encoded.
///
/// `Debug` output is redacted so tokens never reach the logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Draw a fresh token from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0_u8; SESSION_ID_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Parse a token presented by a client.
    pub fn parse(raw: &str) -> Result<Self, SessionIdValidationError> {
        let expected = SESSION_ID_BYTES * 2;
        let well_formed = raw.len() == expected
            && raw
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if well_formed {
            Ok(Self(raw.to_owned()))
        } else {
            Err(SessionIdValidationError { expected })
        }
    }

    /// Token as sent in the cookie.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionId(..)")
    }
}

/// A persisted session record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session has lapsed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
