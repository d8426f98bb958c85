//! Property service: tenant-scoped property management

use keystone_api_types::{ApiError, ApiResult, ListResponse, TenantScope};
use keystone_storage::entities::{Properties, Property};
use keystone_storage::repositories::{NewProperty, PropertyPatch, RepositoryFactory};
use keystone_storage::ListParams;
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub struct PropertyService {
    repos: RepositoryFactory,
}

impl PropertyService {
    pub fn new(repos: RepositoryFactory) -> Self {
        Self { repos }
    }

    pub async fn create_property(
        &self,
        scope: TenantScope,
        new: NewProperty,
    ) -> ApiResult<Property> {
        if self
            .repos
            .properties
            .code_exists(scope, &new.property_code, None)
            .await?
        {
            return Err(ApiError::conflict("Property", &new.property_code));
        }

        let property = self.repos.properties.create(scope, new).await?;
        info!(%scope, property_id = property.id, code = %property.property_code, "property created");
        Ok(property)
    }

    pub async fn get_property(&self, scope: TenantScope, id: i32) -> ApiResult<Property> {
        self.repos
            .properties
            .find_by_id(scope, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Property", id))
    }

    pub async fn get_property_by_uuid(
        &self,
        scope: TenantScope,
        uuid: Uuid,
    ) -> ApiResult<Property> {
        self.repos
            .properties
            .find_by_uuid(scope, uuid)
            .await?
            .ok_or_else(|| ApiError::not_found("Property", uuid))
    }

    pub async fn list_properties(
        &self,
        scope: TenantScope,
        params: ListParams<Properties>,
    ) -> ApiResult<ListResponse<Property>> {
        let pagination = params.pagination;
        let (items, total) = self.repos.properties.list(scope, params).await?;
        Ok(ListResponse::new(items, total, pagination))
    }

    pub async fn update_property(
        &self,
        scope: TenantScope,
        id: i32,
        patch: PropertyPatch,
    ) -> ApiResult<Property> {
        self.repos
            .properties
            .update(scope, id, patch)
            .await?
            .ok_or_else(|| ApiError::not_found("Property", id))
    }

    /// Soft delete. Refused while the property still has units.
    pub async fn delete_property(&self, scope: TenantScope, id: i32) -> ApiResult<()> {
        let property = self.get_property(scope, id).await?;
        let units = self
            .repos
            .units
            .property_unit_count(scope, property.id)
            .await?;
        if units > 0 {
            return Err(ApiError::validation(
                "property has units; remove them first",
            ));
        }

        self.repos.properties.soft_delete(scope, id).await?;
        info!(%scope, property_id = id, "property deleted");
        Ok(())
    }
}
