//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` so they depend only on the
//! domain services and can be exercised without I/O.

use std::sync::Arc;

use crate::domain::{AuthService, LibraryService, UserAdminService};

use super::session_config::SessionCookieConfig;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<AuthService>,
    pub library: Arc<LibraryService>,
    pub admin: Arc<UserAdminService>,
    pub cookies: SessionCookieConfig,
}

impl HttpState {
    pub fn new(
        auth: AuthService,
        library: LibraryService,
        admin: UserAdminService,
        cookies: SessionCookieConfig,
    ) -> Self {
        Self {
            auth: Arc::new(auth),
            library: Arc::new(library),
            admin: Arc::new(admin),
            cookies,
        }
    }
}
