//! Session lifecycle on top of the durable session port.
//!
//! Expired sessions are treated as absent and removed as soon as they are
//! observed. [`SessionStore::purge_expired`] sweeps the rest.

use std::sync::Arc;

use chrono::TimeDelta;
use mockable::Clock;
use tracing::debug;

use super::persistence_error_mapping::map_session_persistence_error;
use super::ports::SessionRepository;
use super::{Error, Session, SessionId, UserId};

/// Creates, loads, extends and destroys sessions.
#[derive(Clone)]
pub struct SessionStore {
    repository: Arc<dyn SessionRepository>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
}

impl SessionStore {
    /// Create a store issuing sessions that live for `ttl` after their last
    /// use.
    pub fn new(repository: Arc<dyn SessionRepository>, clock: Arc<dyn Clock>, ttl: TimeDelta) -> Self {
        Self {
            repository,
            clock,
            ttl,
        }
    }

    /// Session lifetime.
    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Open a new session for `user_id`.
    pub async fn create(&self, user_id: UserId) -> Result<Session, Error> {
        let session = Session {
            id: SessionId::generate(),
            user_id,
            expires_at: self.clock.utc() + self.ttl,
        };
        self.repository
            .insert(&session)
            .await
            .map_err(map_session_persistence_error)?;
        debug!(user_id = %user_id, "session created");
        Ok(session)
    }

    /// Load a live session. Expired records are deleted and reported absent.
    pub async fn load(&self, id: &SessionId) -> Result<Option<Session>, Error> {
        let Some(session) = self
            .repository
            .find(id)
            .await
            .map_err(map_session_persistence_error)?
        else {
            return Ok(None);
        };

        if session.is_expired(self.clock.utc()) {
            debug!(user_id = %session.user_id, "discarding expired session");
            self.destroy(id).await?;
            return Ok(None);
        }
        Ok(Some(session))
    }

    /// Push the expiry of a live session out by the TTL.
    pub async fn touch(&self, id: &SessionId) -> Result<(), Error> {
        let expires_at = self.clock.utc() + self.ttl;
        self.repository
            .extend(id, expires_at)
            .await
            .map_err(map_session_persistence_error)?;
        Ok(())
    }

    /// Remove a session. Unknown ids are ignored.
    pub async fn destroy(&self, id: &SessionId) -> Result<(), Error> {
        self.repository
            .delete(id)
            .await
            .map_err(map_session_persistence_error)?;
        Ok(())
    }

    /// Remove every expired session, returning how many were dropped.
    pub async fn purge_expired(&self) -> Result<u64, Error> {
        self.repository
            .delete_expired(self.clock.utc())
            .await
            .map_err(map_session_persistence_error)
    }
}
