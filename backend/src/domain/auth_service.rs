//! Registration, login, logout and session-to-identity binding.
//!
//! Key derivation is CPU bound, so hashing and verification run on the
//! blocking pool.

use std::sync::Arc;

use tracing::{info, warn};
use zeroize::Zeroizing;

use super::persistence_error_mapping::map_user_persistence_error;
use super::ports::UserRepository;
use super::{
    CredentialHasher, CredentialRecord, Error, LoginCredentials, NewUser, Registration, Session,
    SessionId, SessionStore, User,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Hash `password` on the blocking pool.
pub(crate) async fn hash_password(
    hasher: CredentialHasher,
    password: Zeroizing<String>,
) -> Result<CredentialRecord, Error> {
    tokio::task::spawn_blocking(move || hasher.hash(password.as_str()))
        .await
        .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
        .map_err(|err| Error::internal(format!("password hashing failed: {err}")))
}

async fn verify_password(
    hasher: CredentialHasher,
    password: Zeroizing<String>,
    record: CredentialRecord,
) -> Result<bool, Error> {
    tokio::task::spawn_blocking(move || hasher.verify(password.as_str(), &record))
        .await
        .map_err(|err| Error::internal(format!("password verification task failed: {err}")))
}

/// Authentication use-cases.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: SessionStore,
    hasher: CredentialHasher,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, sessions: SessionStore, hasher: CredentialHasher) -> Self {
        Self {
            users,
            sessions,
            hasher,
        }
    }

    /// Underlying session store.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Create an account.
    ///
    /// The administrator role is granted only when `actor` is already an
    /// administrator; otherwise the request is downgraded to a regular user.
    pub async fn register(
        &self,
        actor: Option<&User>,
        registration: Registration,
    ) -> Result<User, Error> {
        let existing = self
            .users
            .find_by_username(registration.username())
            .await
            .map_err(map_user_persistence_error)?;
        if existing.is_some() {
            return Err(Error::invalid_request("Username already exists"));
        }

        let caller_is_admin = actor.is_some_and(User::is_admin);
        if registration.requests_admin() && !caller_is_admin {
            warn!(
                username = %registration.username(),
                "ignoring admin flag on registration from a non-admin caller"
            );
        }

        let credential = hash_password(self.hasher, registration.password_secret()).await?;
        let user = self
            .users
            .create(NewUser {
                username: registration.username().clone(),
                credential,
                is_admin: registration.requests_admin() && caller_is_admin,
            })
            .await
            .map_err(map_user_persistence_error)?;
        info!(user_id = %user.id(), is_admin = user.is_admin(), "user registered");
        Ok(user)
    }

    /// Verify credentials and open a session.
    ///
    /// Unknown usernames and wrong passwords fail identically, and both paths
    /// perform one key derivation.
    /// The name is looked up as typed first, then trimmed, so both padded
    /// legacy accounts and users who paste stray whitespace can sign in.
    pub async fn login(&self, credentials: LoginCredentials) -> Result<(User, Session), Error> {
        let mut account = self
            .users
            .find_by_username(credentials.username())
            .await
            .map_err(map_user_persistence_error)?;
        if let (None, Some(trimmed)) = (&account, credentials.username().trimmed()) {
            account = self
                .users
                .find_by_username(&trimmed)
                .await
                .map_err(map_user_persistence_error)?;
        }

        let Some(account) = account else {
            verify_password(
                self.hasher,
                credentials.password_secret(),
                CredentialRecord::placeholder(),
            )
            .await?;
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let matches = verify_password(
            self.hasher,
            credentials.password_secret(),
            account.credential,
        )
        .await?;
        if !matches {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        let session = self.sessions.create(account.user.id()).await?;
        info!(user_id = %account.user.id(), "user logged in");
        Ok((account.user, session))
    }

    /// End a session. Unknown or already-ended sessions are ignored.
    pub async fn logout(&self, session_id: &SessionId) -> Result<(), Error> {
        self.sessions.destroy(session_id).await
    }

    /// Resolve the user behind a session, re-reading the account each time so
    /// role changes and deletions take effect immediately.
    pub async fn resolve_identity(&self, session_id: &SessionId) -> Result<User, Error> {
        let Some(session) = self.sessions.load(session_id).await? else {
            return Err(Error::unauthorized("login required"));
        };

        let user = self
            .users
            .find_by_id(session.user_id)
            .await
            .map_err(map_user_persistence_error)?;
        let Some(user) = user else {
            warn!(user_id = %session.user_id, "session refers to a deleted user");
            self.sessions.destroy(session_id).await?;
            return Err(Error::unauthorized("login required"));
        };

        self.sessions.touch(session_id).await?;
        Ok(user)
    }
}
