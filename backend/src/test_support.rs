//! Test utilities shared by unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled only for tests or with the `test-support` feature.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::{
    AuthService, CredentialHasher, LibraryService, NewUser, ScryptCost, SessionStore, User,
    UserAdminService, Username,
};
use crate::domain::ports::UserRepository;
use crate::outbound::memory::{
    InMemoryResourceRepository, InMemorySessionRepository, InMemoryUserRepository,
};

/// Clock whose time only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// A hasher with a trivial work factor so tests stay fast.
pub fn cheap_hasher() -> CredentialHasher {
    CredentialHasher::new(ScryptCost::new(4, 8, 1))
}

/// Fully wired services over in-memory adapters.
pub struct MemoryLibrary {
    pub users: Arc<InMemoryUserRepository>,
    pub resources: Arc<InMemoryResourceRepository>,
    pub sessions: Arc<InMemorySessionRepository>,
    pub clock: Arc<MutableClock>,
    pub auth: AuthService,
    pub library: LibraryService,
    pub admin: UserAdminService,
}

impl MemoryLibrary {
    /// Build a library whose sessions live for `ttl`.
    pub fn with_ttl(ttl: TimeDelta) -> Self {
        let users = Arc::new(InMemoryUserRepository::default());
        let resources = Arc::new(InMemoryResourceRepository::default());
        let sessions = Arc::new(InMemorySessionRepository::default());
        let clock = Arc::new(MutableClock::new(Utc::now()));
        let hasher = cheap_hasher();
        let store = SessionStore::new(sessions.clone(), clock.clone(), ttl);
        Self {
            auth: AuthService::new(users.clone(), store, hasher),
            library: LibraryService::new(resources.clone()),
            admin: UserAdminService::new(users.clone(), hasher),
            users,
            resources,
            sessions,
            clock,
        }
    }

    /// Insert a user directly, bypassing registration rules. The username is
    /// stored verbatim, padding included.
    ///
    /// # Panics
    /// Panics when the username is blank or already taken.
    pub async fn seed_user(&self, username: &str, password: &str, is_admin: bool) -> User {
        let credential = match cheap_hasher().hash(password) {
            Ok(record) => record,
            Err(err) => panic!("hashing fixture password failed: {err}"),
        };
        let username = match Username::stored(username) {
            Ok(name) => name,
            Err(err) => panic!("invalid fixture username: {err}"),
        };
        match self
            .users
            .create(NewUser {
                username,
                credential,
                is_admin,
            })
            .await
        {
            Ok(user) => user,
            Err(err) => panic!("seeding user failed: {err}"),
        }
    }
}

impl Default for MemoryLibrary {
    fn default() -> Self {
        Self::with_ttl(TimeDelta::hours(1))
    }
}
