//! User administration endpoints. Administrators only.
//!
//! ```text
//! GET    /api/users
//! PATCH  /api/users/{id}  {"isAdmin":true} | {"password":"new"}
//! DELETE /api/users/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, web};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::authorization::require_user_manager;
use crate::domain::{Error, User, UserId, UserUpdate};

use super::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;
use super::validation::{empty_password_error, parse_json_body};

/// Body for `PATCH /api/users/{id}`. Unknown fields are rejected.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub is_admin: Option<bool>,
    pub password: Option<String>,
}

impl TryFrom<UpdateUserRequest> for UserUpdate {
    type Error = Error;

    fn try_from(value: UpdateUserRequest) -> Result<Self, Self::Error> {
        let password = match value.password {
            Some(pw) if pw.is_empty() => return Err(empty_password_error()),
            other => other.map(Zeroizing::new),
        };
        Ok(Self {
            is_admin: value.is_admin,
            password,
        })
    }
}

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users", body = [User]),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin access required", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<User>>> {
    let actor = session.require_user().await?;
    Ok(web::Json(state.admin.list(&actor).await?))
}

/// Change a user's role or password.
#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated", body = User),
        (status = 400, description = "Invalid update or last administrator", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin access required", body = Error),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[patch("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    body: web::Bytes,
) -> ApiResult<web::Json<User>> {
    let actor = session.require_user().await?;
    require_user_manager(&actor)?;
    let update = UserUpdate::try_from(parse_json_body::<UpdateUserRequest>(&body)?)?;
    let id = UserId::new(path.into_inner());
    Ok(web::Json(state.admin.update(&actor, id, update).await?))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Cannot delete your own account", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin access required", body = Error),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user().await?;
    state
        .admin
        .delete(&actor, UserId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
