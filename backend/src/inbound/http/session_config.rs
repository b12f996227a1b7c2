//! Session cookie attributes.
//!
//! The cookie only carries the opaque [`SessionId`]; everything else lives in
//! the session store.

use actix_web::cookie::{Cookie, SameSite, time};
use chrono::TimeDelta;

use crate::domain::SessionId;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Rejected cookie settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionCookieError {
    #[error("invalid SameSite value '{value}'; expected Strict|Lax|None")]
    InvalidSameSite { value: String },
    #[error("SameSite=None requires a Secure cookie")]
    InsecureSameSiteNone,
}

/// Parse a `SameSite` policy, case-insensitively.
pub fn parse_same_site(value: &str) -> Result<SameSite, SessionCookieError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "strict" => Ok(SameSite::Strict),
        "lax" => Ok(SameSite::Lax),
        "none" => Ok(SameSite::None),
        _ => Err(SessionCookieError::InvalidSameSite {
            value: value.to_owned(),
        }),
    }
}

/// How session cookies are issued and cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCookieConfig {
    secure: bool,
    same_site: SameSite,
    max_age: time::Duration,
}

impl SessionCookieConfig {
    /// Build a config whose cookies live as long as a session.
    ///
    /// Browsers drop `SameSite=None` cookies that are not `Secure`, so that
    /// combination is rejected.
    pub fn new(
        secure: bool,
        same_site: SameSite,
        ttl: TimeDelta,
    ) -> Result<Self, SessionCookieError> {
        if same_site == SameSite::None && !secure {
            return Err(SessionCookieError::InsecureSameSiteNone);
        }
        Ok(Self {
            secure,
            same_site,
            max_age: time::Duration::seconds(ttl.num_seconds()),
        })
    }

    /// Plain-HTTP cookies for in-process tests and local development.
    pub fn insecure(ttl: TimeDelta) -> Self {
        Self {
            secure: false,
            same_site: SameSite::Lax,
            max_age: time::Duration::seconds(ttl.num_seconds()),
        }
    }

    /// Cookie carrying a freshly issued session.
    pub fn issue(&self, id: &SessionId) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, id.as_str().to_owned())
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .max_age(self.max_age)
            .finish()
    }

    /// Cookie instructing the browser to forget the session.
    pub fn clear(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(SESSION_COOKIE, "")
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .finish();
        cookie.make_removal();
        cookie
    }
}
