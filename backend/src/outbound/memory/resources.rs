//! In-memory `ResourceRepository`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::ports::{ResourcePersistenceError, ResourceRepository};
use crate::domain::{NewResource, Resource, ResourceId, ResourcePatch};

#[derive(Default)]
struct ResourceTable {
    next_id: i32,
    rows: BTreeMap<ResourceId, Resource>,
}

/// `ResourceRepository` backed by an ordered map.
#[derive(Default)]
pub struct InMemoryResourceRepository {
    table: Mutex<ResourceTable>,
}

#[async_trait]
impl ResourceRepository for InMemoryResourceRepository {
    async fn create(&self, resource: NewResource) -> Result<Resource, ResourcePersistenceError> {
        let mut table = self.table.lock().await;
        table.next_id += 1;
        let id = ResourceId::new(table.next_id);
        let NewResource {
            title,
            category,
            content,
            requires_admin,
        } = resource;
        let created = Resource {
            id,
            title,
            category,
            content,
            requires_admin,
        };
        table.rows.insert(id, created.clone());
        Ok(created)
    }

    async fn find_by_id(
        &self,
        id: ResourceId,
    ) -> Result<Option<Resource>, ResourcePersistenceError> {
        Ok(self.table.lock().await.rows.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Resource>, ResourcePersistenceError> {
        Ok(self.table.lock().await.rows.values().cloned().collect())
    }

    async fn update(
        &self,
        id: ResourceId,
        patch: ResourcePatch,
    ) -> Result<Option<Resource>, ResourcePersistenceError> {
        let mut table = self.table.lock().await;
        let Some(resource) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply_to(resource);
        Ok(Some(resource.clone()))
    }

    async fn delete(&self, id: ResourceId) -> Result<bool, ResourcePersistenceError> {
        Ok(self.table.lock().await.rows.remove(&id).is_some())
    }
}
