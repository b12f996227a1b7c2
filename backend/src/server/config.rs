//! HTTP server configuration object.

use std::net::SocketAddr;
use std::time::Duration;

use resource_library::inbound::http::session_config::SessionCookieConfig;
use resource_library::outbound::persistence::DbPool;

/// Where accounts, resources and sessions are kept.
pub enum Storage {
    Postgres(DbPool),
    /// Lost on restart; development only.
    Memory,
}

/// Everything needed to start the server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) cookies: SessionCookieConfig,
    pub(crate) session_ttl: chrono::TimeDelta,
    pub(crate) sweep_interval: Duration,
    pub(crate) storage: Storage,
}

impl ServerConfig {
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        cookies: SessionCookieConfig,
        session_ttl: chrono::TimeDelta,
        storage: Storage,
    ) -> Self {
        Self {
            bind_addr,
            cookies,
            session_ttl,
            sweep_interval: Duration::from_secs(900),
            storage,
        }
    }

    /// How often expired sessions are purged.
    #[must_use]
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}
