//! Server settings loaded via OrthoConfig.
//!
//! Values are layered from defaults, an optional config file, `LIBRARY_*`
//! environment variables and command-line flags.

use std::net::SocketAddr;
use std::time::Duration;

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::inbound::http::session_config::{
    SessionCookieConfig, SessionCookieError, parse_same_site,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_TTL_HOURS: u32 = 24 * 7;
const DEFAULT_SESSION_SWEEP_SECS: u64 = 900;
const DEFAULT_SAME_SITE: &str = "Lax";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Settings rejected after loading.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("session TTL must be at least one hour")]
    ZeroSessionTtl,
    #[error(transparent)]
    Cookie(#[from] SessionCookieError),
}

/// Configuration for the library server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LIBRARY")]
pub struct LibrarySettings {
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Session lifetime in hours; renewed on every authenticated request.
    pub session_ttl_hours: Option<u32>,
    /// Seconds between sweeps of expired sessions.
    pub session_sweep_secs: Option<u64>,
    /// Mark the session cookie `Secure`.
    #[ortho_config(default = true)]
    pub cookie_secure: bool,
    /// `SameSite` policy for the session cookie: Strict, Lax or None.
    pub same_site: Option<String>,
    /// Use process-local storage instead of PostgreSQL.
    #[ortho_config(default = false)]
    pub in_memory: bool,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
}

impl LibrarySettings {
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|source| SettingsError::BindAddr {
            value: raw.to_owned(),
            source,
        })
    }

    pub fn session_ttl(&self) -> Result<TimeDelta, SettingsError> {
        match self.session_ttl_hours.unwrap_or(DEFAULT_SESSION_TTL_HOURS) {
            0 => Err(SettingsError::ZeroSessionTtl),
            hours => Ok(TimeDelta::hours(i64::from(hours))),
        }
    }

    pub fn session_sweep_interval(&self) -> Duration {
        Duration::from_secs(
            self.session_sweep_secs
                .unwrap_or(DEFAULT_SESSION_SWEEP_SECS)
                .max(1),
        )
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE).max(1)
    }

    /// Cookie attributes derived from the TTL and cookie toggles.
    pub fn cookie_config(&self) -> Result<SessionCookieConfig, SettingsError> {
        let same_site = parse_same_site(self.same_site.as_deref().unwrap_or(DEFAULT_SAME_SITE))?;
        Ok(SessionCookieConfig::new(
            self.cookie_secure,
            same_site,
            self.session_ttl()?,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 8] = [
        "LIBRARY_DATABASE_URL",
        "LIBRARY_BIND_ADDR",
        "LIBRARY_SESSION_TTL_HOURS",
        "LIBRARY_SESSION_SWEEP_SECS",
        "LIBRARY_COOKIE_SECURE",
        "LIBRARY_SAME_SITE",
        "LIBRARY_IN_MEMORY",
        "LIBRARY_POOL_MAX_SIZE",
    ];

    fn load() -> LibrarySettings {
        LibrarySettings::load_from_iter([OsString::from("resource-library")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load();
        assert_eq!(settings.database_url(), None);
        assert_eq!(
            settings.bind_addr().expect("bind addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("addr")
        );
        assert_eq!(settings.session_ttl().expect("ttl"), TimeDelta::hours(168));
        assert_eq!(settings.session_sweep_interval(), Duration::from_secs(900));
        assert!(settings.cookie_secure);
        assert!(!settings.in_memory);
        assert_eq!(settings.pool_max_size(), 10);
        assert!(settings.cookie_config().is_ok());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("LIBRARY_DATABASE_URL", Some("postgres://db/library".to_owned())),
            ("LIBRARY_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            ("LIBRARY_SESSION_TTL_HOURS", Some("2".to_owned())),
            ("LIBRARY_SESSION_SWEEP_SECS", Some("30".to_owned())),
            ("LIBRARY_COOKIE_SECURE", Some("false".to_owned())),
            ("LIBRARY_SAME_SITE", Some("strict".to_owned())),
            ("LIBRARY_IN_MEMORY", Some("true".to_owned())),
            ("LIBRARY_POOL_MAX_SIZE", Some("4".to_owned())),
        ]);

        let settings = load();
        assert_eq!(settings.database_url(), Some("postgres://db/library"));
        assert_eq!(
            settings.bind_addr().expect("bind addr").port(),
            9000
        );
        assert_eq!(settings.session_ttl().expect("ttl"), TimeDelta::hours(2));
        assert_eq!(settings.session_sweep_interval(), Duration::from_secs(30));
        assert!(!settings.cookie_secure);
        assert!(settings.in_memory);
        assert_eq!(settings.pool_max_size(), 4);
    }

    #[rstest]
    #[case("LIBRARY_BIND_ADDR", "not an address")]
    #[case("LIBRARY_SAME_SITE", "sometimes")]
    #[case("LIBRARY_SESSION_TTL_HOURS", "0")]
    fn invalid_values_are_reported(#[case] name: &str, #[case] value: &str) {
        let mut vars = VARS.map(|var| (var, None::<String>));
        if let Some(slot) = vars.iter_mut().find(|(var, _)| *var == name) {
            slot.1 = Some(value.to_owned());
        }
        let _guard = lock_env(vars);

        let settings = load();
        let failed = settings.bind_addr().is_err() || settings.cookie_config().is_err();
        assert!(failed, "{name}={value} should be rejected");
    }

    #[rstest]
    fn same_site_none_requires_secure_cookie() {
        let _guard = lock_env(VARS.map(|name| match name {
            "LIBRARY_SAME_SITE" => (name, Some("None".to_owned())),
            "LIBRARY_COOKIE_SECURE" => (name, Some("false".to_owned())),
            _ => (name, None),
        }));

        let err = load().cookie_config().expect_err("insecure SameSite=None");
        assert!(matches!(
            err,
            SettingsError::Cookie(SessionCookieError::InsecureSameSiteNone)
        ));
    }
}
