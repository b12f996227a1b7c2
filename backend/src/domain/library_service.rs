//! Resource use-cases: the authorization guard in front of the repository.
//!
//! Write operations check the actor's role before touching storage, so a
//! non-administrator learns nothing about which ids exist.

use std::sync::Arc;

use tracing::info;

use super::authorization::{can_read_resource, require_resource_writer};
use super::persistence_error_mapping::map_resource_persistence_error;
use super::ports::ResourceRepository;
use super::{Error, NewResource, Resource, ResourceId, ResourcePatch, User};

fn resource_not_found(id: ResourceId) -> Error {
    Error::not_found(format!("resource {id} not found"))
}

/// Library read and administration use-cases.
#[derive(Clone)]
pub struct LibraryService {
    resources: Arc<dyn ResourceRepository>,
}

impl LibraryService {
    pub fn new(resources: Arc<dyn ResourceRepository>) -> Self {
        Self { resources }
    }

    /// Every resource the actor may read, in id order.
    pub async fn list_visible(&self, actor: &User) -> Result<Vec<Resource>, Error> {
        let resources = self
            .resources
            .list()
            .await
            .map_err(map_resource_persistence_error)?;
        Ok(resources
            .into_iter()
            .filter(|resource| can_read_resource(actor, resource))
            .collect())
    }

    /// A single resource. Missing ids are `not_found`; admin-only resources
    /// are `forbidden` for everyone else.
    pub async fn get(&self, actor: &User, id: ResourceId) -> Result<Resource, Error> {
        let resource = self
            .resources
            .find_by_id(id)
            .await
            .map_err(map_resource_persistence_error)?
            .ok_or_else(|| resource_not_found(id))?;
        if !can_read_resource(actor, &resource) {
            return Err(Error::forbidden("admin access required"));
        }
        Ok(resource)
    }

    pub async fn create(&self, actor: &User, resource: NewResource) -> Result<Resource, Error> {
        require_resource_writer(actor)?;
        let created = self
            .resources
            .create(resource)
            .await
            .map_err(map_resource_persistence_error)?;
        info!(resource_id = %created.id, actor = %actor.id(), "resource created");
        Ok(created)
    }

    /// Apply a partial update. Empty patches are rejected.
    pub async fn update(
        &self,
        actor: &User,
        id: ResourceId,
        patch: ResourcePatch,
    ) -> Result<Resource, Error> {
        require_resource_writer(actor)?;
        if patch.is_empty() {
            return Err(Error::invalid_request("no fields to update"));
        }
        let updated = self
            .resources
            .update(id, patch)
            .await
            .map_err(map_resource_persistence_error)?
            .ok_or_else(|| resource_not_found(id))?;
        info!(resource_id = %id, actor = %actor.id(), "resource updated");
        Ok(updated)
    }

    pub async fn delete(&self, actor: &User, id: ResourceId) -> Result<(), Error> {
        require_resource_writer(actor)?;
        let deleted = self
            .resources
            .delete(id)
            .await
            .map_err(map_resource_persistence_error)?;
        if !deleted {
            return Err(resource_not_found(id));
        }
        info!(resource_id = %id, actor = %actor.id(), "resource deleted");
        Ok(())
    }
}
