//! PostgreSQL-backed `ResourceRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{ResourcePersistenceError, ResourceRepository};
use crate::domain::{
    Category, NewResource, Resource, ResourceContent, ResourceId, ResourcePatch, ResourceTitle,
    ResourceValidationError,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewResourceRow, ResourceChangeset, ResourceRow};
use super::pool::{DbPool, PoolError};
use super::schema::resources;

/// Diesel adapter for the `resources` table.
#[derive(Clone)]
pub struct DieselResourceRepository {
    pool: DbPool,
}

impl DieselResourceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> ResourcePersistenceError {
    map_pool_error(error, ResourcePersistenceError::connection)
}

fn diesel_error(error: diesel::result::Error) -> ResourcePersistenceError {
    map_diesel_error(
        error,
        ResourcePersistenceError::query,
        ResourcePersistenceError::connection,
    )
}

/// Rows written outside this service may violate domain rules, for example a
/// free-text category from an older deployment. A single lookup surfaces that
/// as a query failure rather than serving a malformed resource.
fn row_to_resource(row: ResourceRow) -> Result<Resource, ResourcePersistenceError> {
    let id = row.id;
    let invalid = |err: ResourceValidationError| {
        ResourcePersistenceError::query(format!("invalid stored resource {id}: {err}"))
    };
    Ok(Resource {
        id: ResourceId::new(id),
        title: ResourceTitle::new(&row.title).map_err(invalid)?,
        category: row.category.parse::<Category>().map_err(invalid)?,
        content: ResourceContent::new(row.content).map_err(invalid)?,
        requires_admin: row.requires_admin,
    })
}

/// Decode a listing, leaving out rows that no longer satisfy domain rules so
/// one bad record cannot hide every other resource.
fn decode_listing(rows: Vec<ResourceRow>) -> Vec<Resource> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            row_to_resource(row)
                .inspect_err(|error| warn!(resource_id = id, %error, "skipping undecodable resource"))
                .ok()
        })
        .collect()
}

#[async_trait]
impl ResourceRepository for DieselResourceRepository {
    async fn create(&self, resource: NewResource) -> Result<Resource, ResourcePersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = NewResourceRow {
            title: resource.title.as_str(),
            category: resource.category.as_str(),
            content: resource.content.as_str(),
            requires_admin: resource.requires_admin,
        };
        let inserted = diesel::insert_into(resources::table)
            .values(&row)
            .returning(ResourceRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        row_to_resource(inserted)
    }

    async fn find_by_id(
        &self,
        id: ResourceId,
    ) -> Result<Option<Resource>, ResourcePersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        resources::table
            .find(id.get())
            .select(ResourceRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_resource)
            .transpose()
    }

    async fn list(&self) -> Result<Vec<Resource>, ResourcePersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<ResourceRow> = resources::table
            .order(resources::id.asc())
            .select(ResourceRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(decode_listing(rows))
    }

    async fn update(
        &self,
        id: ResourceId,
        patch: ResourcePatch,
    ) -> Result<Option<Resource>, ResourcePersistenceError> {
        if patch.is_empty() {
            return self.find_by_id(id).await;
        }
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let changes = ResourceChangeset {
            title: patch.title.as_ref().map(ResourceTitle::as_str),
            category: patch.category.map(Category::as_str),
            content: patch.content.as_ref().map(ResourceContent::as_str),
            requires_admin: patch.requires_admin,
        };
        diesel::update(resources::table.find(id.get()))
            .set(&changes)
            .returning(ResourceRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_resource)
            .transpose()
    }

    async fn delete(&self, id: ResourceId) -> Result<bool, ResourcePersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let deleted = diesel::delete(resources::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(deleted > 0)
    }
}
