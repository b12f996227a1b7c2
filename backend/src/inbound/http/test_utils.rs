//! Test helpers for inbound HTTP components.

use actix_web::web;

use crate::test_support::MemoryLibrary;

use super::session_config::SessionCookieConfig;
use super::state::HttpState;

/// HTTP state over the library's in-memory services, with cookies usable on
/// plain HTTP.
pub fn memory_state(lib: &MemoryLibrary) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(
        lib.auth.clone(),
        lib.library.clone(),
        lib.admin.clone(),
        SessionCookieConfig::insecure(lib.auth.sessions().ttl()),
    ))
}
