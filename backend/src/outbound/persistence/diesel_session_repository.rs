//! PostgreSQL-backed `SessionRepository`.
//!
//! The `user_sessions` table is not managed by migrations: [`connect`] creates
//! it on first use so deployments sharing a database with an older session
//! store need no manual DDL.
//!
//! [`connect`]: DieselSessionRepository::connect

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{RunQueryDsl, SimpleAsyncConnection};
use tracing::debug;

use crate::domain::ports::{SessionPersistenceError, SessionRepository};
use crate::domain::{Session, SessionId, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::SessionRow;
use super::pool::{DbPool, PoolError};
use super::schema::user_sessions;

const CREATE_SESSION_TABLE: &str = "
CREATE TABLE IF NOT EXISTS user_sessions (
    sid VARCHAR NOT NULL PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    expire TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_user_sessions_expire ON user_sessions (expire);
";

/// Diesel adapter for the `user_sessions` table.
#[derive(Clone)]
pub struct DieselSessionRepository {
    pool: DbPool,
}

impl DieselSessionRepository {
    /// Ensure the session table exists and return the adapter.
    ///
    /// Requires the `users` table, so run migrations first.
    ///
    /// # Errors
    /// Returns a connection error when the database is unreachable and a
    /// query error when the DDL fails.
    pub async fn connect(pool: DbPool) -> Result<Self, SessionPersistenceError> {
        {
            let mut conn = pool.get().await.map_err(pool_error)?;
            conn.batch_execute(CREATE_SESSION_TABLE)
                .await
                .map_err(diesel_error)?;
        }
        debug!("session table ready");
        Ok(Self { pool })
    }
}

fn pool_error(error: PoolError) -> SessionPersistenceError {
    map_pool_error(error, SessionPersistenceError::connection)
}

fn diesel_error(error: diesel::result::Error) -> SessionPersistenceError {
    map_diesel_error(
        error,
        SessionPersistenceError::query,
        SessionPersistenceError::connection,
    )
}

fn row_to_session(row: SessionRow) -> Result<Session, SessionPersistenceError> {
    let id = SessionId::parse(&row.sid)
        .map_err(|err| SessionPersistenceError::query(format!("malformed session id: {err}")))?;
    Ok(Session {
        id,
        user_id: UserId::new(row.user_id),
        expires_at: row.expire,
    })
}

#[async_trait]
impl SessionRepository for DieselSessionRepository {
    async fn insert(&self, session: &Session) -> Result<(), SessionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = SessionRow {
            sid: session.id.as_str().to_owned(),
            user_id: session.user_id.get(),
            expire: session.expires_at,
        };
        diesel::insert_into(user_sessions::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn find(&self, id: &SessionId) -> Result<Option<Session>, SessionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        user_sessions::table
            .find(id.as_str())
            .select(SessionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_session)
            .transpose()
    }

    async fn extend(
        &self,
        id: &SessionId,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, SessionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let updated = diesel::update(user_sessions::table.find(id.as_str()))
            .set(user_sessions::expire.eq(expires_at))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: &SessionId) -> Result<bool, SessionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let deleted = diesel::delete(user_sessions::table.find(id.as_str()))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(deleted > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let deleted = diesel::delete(user_sessions::table.filter(user_sessions::expire.le(now)))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(u64::try_from(deleted).unwrap_or(u64::MAX))
    }
}
