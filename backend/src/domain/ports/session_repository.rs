//! Port abstraction for durable session storage.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Session, SessionId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by session repository adapters.
    pub enum SessionPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "session repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "session repository query failed: {message}",
    }
}

/// Durable session records keyed by token.
///
/// Adapters store and return rows verbatim; expiry policy lives in
/// [`crate::domain::SessionStore`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a new session.
    async fn insert(&self, session: &Session) -> Result<(), SessionPersistenceError>;

    /// Fetch a session by token, expired or not.
    async fn find(&self, id: &SessionId) -> Result<Option<Session>, SessionPersistenceError>;

    /// Move the expiry of an existing session. Returns whether it existed.
    async fn extend(
        &self,
        id: &SessionId,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, SessionPersistenceError>;

    /// Remove a session. Returns whether it existed.
    async fn delete(&self, id: &SessionId) -> Result<bool, SessionPersistenceError>;

    /// Remove every session that expired at or before `now`.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionPersistenceError>;
}
