//! Port abstraction for resource persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{NewResource, Resource, ResourceId, ResourcePatch};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by resource repository adapters.
    pub enum ResourcePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "resource repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "resource repository query failed: {message}",
    }
}

/// Storage for library resources. Visibility rules are applied by callers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// Insert a resource, assigning a fresh identifier.
    async fn create(&self, resource: NewResource) -> Result<Resource, ResourcePersistenceError>;

    /// Fetch a resource by identifier.
    async fn find_by_id(&self, id: ResourceId)
    -> Result<Option<Resource>, ResourcePersistenceError>;

    /// All resources in ascending id order.
    async fn list(&self) -> Result<Vec<Resource>, ResourcePersistenceError>;

    /// Apply a partial update. Returns `None` when the id is unknown.
    async fn update(
        &self,
        id: ResourceId,
        patch: ResourcePatch,
    ) -> Result<Option<Resource>, ResourcePersistenceError>;

    /// Remove a resource. Returns whether a row was deleted.
    async fn delete(&self, id: ResourceId) -> Result<bool, ResourcePersistenceError>;
}
