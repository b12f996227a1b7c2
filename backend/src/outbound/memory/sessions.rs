//! In-memory `SessionRepository`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::ports::{SessionPersistenceError, SessionRepository};
use crate::domain::{Session, SessionId};

/// `SessionRepository` backed by a hash map keyed by token.
#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: Mutex<HashMap<SessionId, Session>>,
}

impl InMemorySessionRepository {
    /// Number of stored sessions, live or expired.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn insert(&self, session: &Session) -> Result<(), SessionPersistenceError> {
        self.sessions
            .lock()
            .await
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn find(&self, id: &SessionId) -> Result<Option<Session>, SessionPersistenceError> {
        Ok(self.sessions.lock().await.get(id).cloned())
    }

    async fn extend(
        &self,
        id: &SessionId,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, SessionPersistenceError> {
        let mut sessions = self.sessions.lock().await;
        Ok(match sessions.get_mut(id) {
            Some(session) => {
                session.expires_at = expires_at;
                true
            }
            None => false,
        })
    }

    async fn delete(&self, id: &SessionId) -> Result<bool, SessionPersistenceError> {
        Ok(self.sessions.lock().await.remove(id).is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionPersistenceError> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        Ok(u64::try_from(before - sessions.len()).unwrap_or(u64::MAX))
    }
}
