//! OpenAPI document for the JSON API.
//!
//! Served by Swagger UI in debug builds and printed by `openapi-dump`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Category, Error, ErrorCode, Resource, User};
use crate::inbound::http::auth::{LoginRequest, RegisterRequest};
use crate::inbound::http::resources::{CreateResourceRequest, UpdateResourceRequest};
use crate::inbound::http::users::UpdateUserRequest;

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/login or an anonymous POST /api/register.",
            ))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "DevOps resource library API",
        description = "Session-authenticated access to a shared library of DevOps resources."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::current_user,
        crate::inbound::http::resources::list_resources,
        crate::inbound::http::resources::get_resource,
        crate::inbound::http::resources::create_resource,
        crate::inbound::http::resources::update_resource,
        crate::inbound::http::resources::delete_resource,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        Resource,
        Category,
        LoginRequest,
        RegisterRequest,
        CreateResourceRequest,
        UpdateResourceRequest,
        UpdateUserRequest,
    )),
    tags(
        (name = "auth", description = "Registration, login and sessions"),
        (name = "resources", description = "The resource library"),
        (name = "users", description = "User administration"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
