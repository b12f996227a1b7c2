//! Resource library endpoints.
//!
//! ```text
//! GET    /api/resources
//! GET    /api/resources/{id}
//! POST   /api/resources       {"title":..,"category":"security","content":..,"requiresAdmin":true}
//! PATCH  /api/resources/{id}  {"title":..}
//! DELETE /api/resources/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::authorization::require_resource_writer;
use crate::domain::{
    Category, Error, NewResource, Resource, ResourceContent, ResourceId, ResourcePatch,
    ResourceTitle, ResourceValidationError,
};

use super::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;
use super::validation::{parse_json_body, resource_validation_error};

/// Body for `POST /api/resources`. The category is checked against the
/// closed set.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceRequest {
    pub title: String,
    #[schema(example = "cicd")]
    pub category: String,
    pub content: String,
    #[serde(default)]
    pub requires_admin: bool,
}

impl TryFrom<CreateResourceRequest> for NewResource {
    type Error = ResourceValidationError;

    fn try_from(value: CreateResourceRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: ResourceTitle::new(&value.title)?,
            category: value.category.parse::<Category>()?,
            content: ResourceContent::new(value.content)?,
            requires_admin: value.requires_admin,
        })
    }
}

/// Body for `PATCH /api/resources/{id}`. Unknown fields, including `id`, are
/// rejected.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateResourceRequest {
    pub title: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
    pub requires_admin: Option<bool>,
}

impl TryFrom<UpdateResourceRequest> for ResourcePatch {
    type Error = ResourceValidationError;

    fn try_from(value: UpdateResourceRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: value.title.map(ResourceTitle::new).transpose()?,
            category: value
                .category
                .map(|raw| raw.parse::<Category>())
                .transpose()?,
            content: value.content.map(ResourceContent::new).transpose()?,
            requires_admin: value.requires_admin,
        })
    }
}

/// Resources visible to the caller.
#[utoipa::path(
    get,
    path = "/api/resources",
    responses(
        (status = 200, description = "Visible resources", body = [Resource]),
        (status = 401, description = "Not logged in", body = Error)
    ),
    tags = ["resources"],
    operation_id = "listResources"
)]
#[get("/resources")]
pub async fn list_resources(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Resource>>> {
    let actor = session.require_user().await?;
    Ok(web::Json(state.library.list_visible(&actor).await?))
}

#[utoipa::path(
    get,
    path = "/api/resources/{id}",
    params(("id" = i32, Path, description = "Resource id")),
    responses(
        (status = 200, description = "Resource", body = Resource),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin-only resource", body = Error),
        (status = 404, description = "No such resource", body = Error)
    ),
    tags = ["resources"],
    operation_id = "getResource"
)]
#[get("/resources/{id}")]
pub async fn get_resource(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<web::Json<Resource>> {
    let actor = session.require_user().await?;
    let id = ResourceId::new(path.into_inner());
    Ok(web::Json(state.library.get(&actor, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/resources",
    request_body = CreateResourceRequest,
    responses(
        (status = 201, description = "Created", body = Resource),
        (status = 400, description = "Invalid resource", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin access required", body = Error)
    ),
    tags = ["resources"],
    operation_id = "createResource"
)]
#[post("/resources")]
pub async fn create_resource(
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user().await?;
    require_resource_writer(&actor)?;
    let payload: CreateResourceRequest = parse_json_body(&body)?;
    let resource = NewResource::try_from(payload).map_err(resource_validation_error)?;
    let created = state.library.create(&actor, resource).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Partial update. Only supplied fields change. Non-administrators are
/// refused before the body is read.
#[utoipa::path(
    patch,
    path = "/api/resources/{id}",
    params(("id" = i32, Path, description = "Resource id")),
    request_body = UpdateResourceRequest,
    responses(
        (status = 200, description = "Updated", body = Resource),
        (status = 400, description = "Invalid or empty update", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin access required", body = Error),
        (status = 404, description = "No such resource", body = Error)
    ),
    tags = ["resources"],
    operation_id = "updateResource"
)]
#[patch("/resources/{id}")]
pub async fn update_resource(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    body: web::Bytes,
) -> ApiResult<web::Json<Resource>> {
    let actor = session.require_user().await?;
    require_resource_writer(&actor)?;
    let payload: UpdateResourceRequest = parse_json_body(&body)?;
    let patch = ResourcePatch::try_from(payload).map_err(resource_validation_error)?;
    let id = ResourceId::new(path.into_inner());
    Ok(web::Json(state.library.update(&actor, id, patch).await?))
}

#[utoipa::path(
    delete,
    path = "/api/resources/{id}",
    params(("id" = i32, Path, description = "Resource id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin access required", body = Error),
        (status = 404, description = "No such resource", body = Error)
    ),
    tags = ["resources"],
    operation_id = "deleteResource"
)]
#[delete("/resources/{id}")]
pub async fn delete_resource(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user().await?;
    state
        .library
        .delete(&actor, ResourceId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
