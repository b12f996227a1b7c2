//! Builders wiring repositories into domain services and HTTP state.

use std::sync::Arc;

use chrono::TimeDelta;

use resource_library::domain::ports::{
    ResourceRepository, SessionPersistenceError, SessionRepository, UserRepository,
};
use resource_library::domain::{
    AuthService, CredentialHasher, LibraryService, SessionStore, UserAdminService,
};
use resource_library::inbound::http::session_config::SessionCookieConfig;
use resource_library::inbound::http::state::HttpState;
use resource_library::outbound::memory::{
    InMemoryResourceRepository, InMemorySessionRepository, InMemoryUserRepository,
};
use resource_library::outbound::persistence::{
    DbPool, DieselResourceRepository, DieselSessionRepository, DieselUserRepository,
};

use super::config::Storage;

/// Driven-port implementations for one storage backend.
pub(crate) struct Repositories {
    users: Arc<dyn UserRepository>,
    resources: Arc<dyn ResourceRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl Repositories {
    /// Build repositories for `storage`. PostgreSQL needs the session table
    /// bootstrapped first.
    pub(crate) async fn for_storage(storage: &Storage) -> Result<Self, SessionPersistenceError> {
        match storage {
            Storage::Postgres(pool) => Self::postgres(pool.clone()).await,
            Storage::Memory => Ok(Self::memory()),
        }
    }

    async fn postgres(pool: DbPool) -> Result<Self, SessionPersistenceError> {
        let sessions = DieselSessionRepository::connect(pool.clone()).await?;
        Ok(Self {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            resources: Arc::new(DieselResourceRepository::new(pool)),
            sessions: Arc::new(sessions),
        })
    }

    fn memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::default()),
            resources: Arc::new(InMemoryResourceRepository::default()),
            sessions: Arc::new(InMemorySessionRepository::default()),
        }
    }
}

/// Domain services plus the session store the sweeper needs.
pub(crate) fn build_http_state(
    repositories: Repositories,
    session_ttl: TimeDelta,
    cookies: SessionCookieConfig,
) -> (HttpState, SessionStore) {
    let Repositories {
        users,
        resources,
        sessions,
    } = repositories;
    let hasher = CredentialHasher::default();
    let store = SessionStore::new(sessions, Arc::new(mockable::DefaultClock), session_ttl);
    let state = HttpState::new(
        AuthService::new(users.clone(), store.clone(), hasher),
        LibraryService::new(resources),
        UserAdminService::new(users, hasher),
        cookies,
    );
    (state, store)
}
