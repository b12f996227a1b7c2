//! Re-issues the session cookie whenever a request extends the session.
//!
//! The store rolls a session's expiry forward each time it is resolved. The
//! browser only learns the new expiry from a fresh `Set-Cookie`, so
//! [`SessionContext`](super::session::SessionContext) marks the request once
//! the caller is resolved and this middleware refreshes the cookie on the way
//! out. Responses that already set the cookie (login, logout) are left alone.

use std::task::{Context, Poll};

use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpMessage, web};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;

use crate::domain::SessionId;

use super::session_config::SESSION_COOKIE;
use super::state::HttpState;

/// Request extension: this session was resolved and extended.
#[derive(Clone)]
pub(crate) struct RenewedSession(pub(crate) SessionId);

/// Middleware factory; [`super::configure_api`] wraps the `/api` scope with it.
#[derive(Clone, Copy, Default)]
pub struct RenewSessionCookie;

impl<S, B> Transform<S, ServiceRequest> for RenewSessionCookie
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RenewSessionCookieMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RenewSessionCookieMiddleware { service }))
    }
}

#[doc(hidden)]
pub struct RenewSessionCookieMiddleware<S> {
    service: S,
}

fn refresh_cookie<B>(res: &mut ServiceResponse<B>) {
    let renewed = res
        .request()
        .extensions()
        .get::<RenewedSession>()
        .map(|marker| marker.0.clone());
    let Some(id) = renewed else {
        return;
    };
    if res
        .response()
        .cookies()
        .any(|cookie| cookie.name() == SESSION_COOKIE)
    {
        return;
    }
    let Some(state) = res.request().app_data::<web::Data<HttpState>>().cloned() else {
        return;
    };
    if let Err(error) = res.response_mut().add_cookie(&state.cookies.issue(&id)) {
        warn!(%error, "failed to refresh session cookie");
    }
}

impl<S, B> Service<ServiceRequest> for RenewSessionCookieMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let inner = self.service.call(req);
        Box::pin(async move {
            let mut res = inner.await?;
            refresh_cookie(&mut res);
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LoginCredentials;
    use crate::inbound::http::session::SessionContext;
    use crate::inbound::http::test_utils::memory_state;
    use crate::test_support::MemoryLibrary;
    use actix_web::cookie::{Cookie, time};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};
    use rstest::rstest;

    async fn whoami(session: SessionContext) -> Result<HttpResponse, crate::domain::Error> {
        let user = session.require_user().await?;
        Ok(HttpResponse::Ok().body(user.username().as_str().to_owned()))
    }

    async fn sign_out(
        state: web::Data<HttpState>,
        session: SessionContext,
    ) -> Result<HttpResponse, crate::domain::Error> {
        session.require_user().await?;
        Ok(HttpResponse::Ok().cookie(state.cookies.clear()).finish())
    }

    async fn logged_in(lib: &MemoryLibrary) -> SessionId {
        lib.seed_user("ada", "pw", false).await;
        let creds = LoginCredentials::try_from_parts("ada", "pw").expect("creds");
        let (_, session) = lib.auth.login(creds).await.expect("login");
        session.id
    }

    fn session_cookies(res: &ServiceResponse) -> Vec<Cookie<'static>> {
        res.response()
            .cookies()
            .filter(|c| c.name() == SESSION_COOKIE)
            .map(Cookie::into_owned)
            .collect()
    }

    #[rstest]
    #[actix_web::test]
    async fn resolved_sessions_get_a_fresh_cookie() {
        let lib = MemoryLibrary::default();
        let id = logged_in(&lib).await;
        let app = test::init_service(
            App::new()
                .app_data(memory_state(&lib))
                .wrap(RenewSessionCookie)
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .cookie(Cookie::new(SESSION_COOKIE, id.as_str().to_owned()))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let cookies = session_cookies(&res);
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].value(), id.as_str());
        assert_eq!(cookies[0].max_age(), Some(time::Duration::hours(1)));
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_sessions_are_not_renewed() {
        let lib = MemoryLibrary::default();
        let app = test::init_service(
            App::new()
                .app_data(memory_state(&lib))
                .wrap(RenewSessionCookie)
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .cookie(Cookie::new(SESSION_COOKIE, "0".repeat(64)))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(session_cookies(&res).is_empty());
    }

    #[rstest]
    #[actix_web::test]
    async fn handler_set_cookies_take_precedence() {
        let lib = MemoryLibrary::default();
        let id = logged_in(&lib).await;
        let app = test::init_service(
            App::new()
                .app_data(memory_state(&lib))
                .wrap(RenewSessionCookie)
                .route("/sign-out", web::post().to(sign_out)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/sign-out")
            .cookie(Cookie::new(SESSION_COOKIE, id.as_str().to_owned()))
            .to_request();
        let res = test::call_service(&app, req).await;
        let cookies = session_cookies(&res);
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].value(), "");
    }
}
