//! Session extraction for HTTP handlers.
//!
//! [`SessionContext`] reads the session cookie and resolves it through the
//! auth service, so handlers deal only in domain users. A successful
//! resolution marks the request so the cookie is re-issued with the extended
//! lifetime.

use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::{Error, ErrorCode, SessionId, User};

use super::session_config::SESSION_COOKIE;
use super::session_renewal::RenewedSession;
use super::state::HttpState;

/// The caller's session token, if any, plus the state needed to resolve it.
pub struct SessionContext {
    req: HttpRequest,
    state: web::Data<HttpState>,
    session_id: Option<SessionId>,
}

impl SessionContext {
    /// The token presented by the client. Malformed cookies are treated as
    /// absent.
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// Resolve the caller, or `401 Unauthorized`.
    pub async fn require_user(&self) -> Result<User, Error> {
        let id = self
            .session_id
            .as_ref()
            .ok_or_else(|| Error::unauthorized("login required"))?;
        let user = self.state.auth.resolve_identity(id).await?;
        self.req.extensions_mut().insert(RenewedSession(id.clone()));
        Ok(user)
    }

    /// Resolve the caller if authenticated. Storage failures still propagate.
    pub async fn current_user(&self) -> Result<Option<User>, Error> {
        match self.require_user().await {
            Ok(user) => Ok(Some(user)),
            Err(err) if err.code() == ErrorCode::Unauthorized => Ok(None),
            Err(err) => Err(err),
        }
    }
}

fn session_id_from(req: &HttpRequest) -> Option<SessionId> {
    let cookie = req.cookie(SESSION_COOKIE)?;
    match SessionId::parse(cookie.value()) {
        Ok(id) => Some(id),
        Err(err) => {
            debug!(error = %err, "ignoring malformed session cookie");
            None
        }
    }
}

impl FromRequest for SessionContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<HttpState>>() {
            Some(state) => Ok(Self {
                req: req.clone(),
                state: state.clone(),
                session_id: session_id_from(req),
            }),
            None => Err(Error::internal("HTTP state is not configured")),
        };
        ready(result)
    }
}
