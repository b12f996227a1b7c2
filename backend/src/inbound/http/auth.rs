//! Account and session endpoints.
//!
//! ```text
//! POST /api/register {"username":"ada","password":"pw","isAdmin":false}
//! POST /api/login    {"username":"ada","password":"pw"}
//! POST /api/logout
//! GET  /api/user
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{Error, LoginCredentials, LoginValidationError, Registration, User};

use super::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;
use super::validation::login_validation_error;

/// Login request body.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// Registration request body. `isAdmin` is honoured only for admin callers.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = LoginValidationError;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password, value.is_admin)
    }
}

/// Create an account.
///
/// Anonymous callers are logged in as the new user. An administrator
/// registering someone else keeps their own session.
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie for anonymous callers"))),
        (status = 400, description = "Invalid request or duplicate username", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration =
        Registration::try_from(payload.into_inner()).map_err(login_validation_error)?;
    let actor = session.current_user().await?;
    let user = state.auth.register(actor.as_ref(), registration).await?;

    let mut response = HttpResponse::Ok();
    if actor.is_none() {
        let new_session = state.auth.sessions().create(user.id()).await?;
        response.cookie(state.cookies.issue(&new_session.id));
    }
    Ok(response.json(user))
}

/// Verify credentials and establish a session.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(login_validation_error)?;
    let (user, session) = state.auth.login(credentials).await?;
    info!(user_id = %user.id(), "login succeeded");
    Ok(HttpResponse::Ok()
        .cookie(state.cookies.issue(&session.id))
        .json(user))
}

/// End the current session. Succeeds whether or not one exists.
#[utoipa::path(
    post,
    path = "/api/logout",
    responses(
        (status = 200, description = "Logged out; session cookie cleared"),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    if let Some(id) = session.session_id() {
        state.auth.logout(id).await?;
    }
    Ok(HttpResponse::Ok().cookie(state.cookies.clear()).finish())
}

/// The authenticated caller.
#[utoipa::path(
    get,
    path = "/api/user",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not logged in", body = Error)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/user")]
pub async fn current_user(session: SessionContext) -> ApiResult<web::Json<User>> {
    Ok(web::Json(session.require_user().await?))
}
