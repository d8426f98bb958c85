//! Property repository: tenant-scoped CRUD with soft delete

use chrono::Utc;
use keystone_api_types::TenantScope;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set};
use uuid::Uuid;

use crate::allocator;
use crate::connection::{DatabaseConnection, DatabaseError};
use crate::entities::{
    Properties, Property, PropertyActiveModel, PropertyColumn, PropertyStatus, PropertyUsageType,
};
use crate::repositories::Repository;
use crate::scoped::{self, ListParams};

#[derive(Debug, Clone)]
pub struct NewProperty {
    pub property_code: String,
    pub property_name: String,
    pub usage_type: PropertyUsageType,
    pub address_line_1: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub total_floors: Option<i32>,
    pub year_built: Option<i32>,
    pub notes: Option<String>,
}

/// Partial update; None leaves the field unchanged. `property_code` is
/// immutable after create.
#[derive(Debug, Clone, Default)]
pub struct PropertyPatch {
    pub property_name: Option<String>,
    pub usage_type: Option<PropertyUsageType>,
    pub address_line_1: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub total_floors: Option<i32>,
    pub year_built: Option<i32>,
    pub status: Option<PropertyStatus>,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct PropertyRepository {
    db: DatabaseConnection,
}

impl PropertyRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        scope: TenantScope,
        new: NewProperty,
    ) -> Result<Property, DatabaseError> {
        let now = Utc::now();
        allocator::insert_with_retry::<PropertyActiveModel, _, _>(
            self.db.get_connection(),
            scope,
            |id| PropertyActiveModel {
                account_id: Set(scope.account_id),
                company_id: Set(scope.company_id),
                id: Set(id),
                uuid: Set(Uuid::new_v4()),
                property_code: Set(new.property_code.clone()),
                property_name: Set(new.property_name.clone()),
                usage_type: Set(new.usage_type),
                address_line_1: Set(new.address_line_1.clone()),
                city: Set(new.city.clone()),
                country: Set(new.country.clone()),
                total_floors: Set(new.total_floors),
                year_built: Set(new.year_built),
                status: Set(PropertyStatus::Active),
                notes: Set(new.notes.clone()),
                is_deleted: Set(false),
                created_at: Set(now),
                updated_at: Set(now),
            },
        )
        .await
    }

    /// Lookup by tenant-local id. Soft-deleted rows are invisible here.
    pub async fn find_by_id(
        &self,
        scope: TenantScope,
        id: i32,
    ) -> Result<Option<Property>, DatabaseError> {
        Ok(scoped::get::<Properties, _>(self.db.get_connection(), scope, id)
            .await?
            .filter(|p| !p.is_deleted))
    }

    pub async fn find_by_uuid(
        &self,
        scope: TenantScope,
        uuid: Uuid,
    ) -> Result<Option<Property>, DatabaseError> {
        Ok(
            scoped::get_by_uuid::<Properties, _>(self.db.get_connection(), scope, uuid)
                .await?
                .filter(|p| !p.is_deleted),
        )
    }

    pub async fn find_by_code(
        &self,
        scope: TenantScope,
        code: &str,
    ) -> Result<Option<Property>, DatabaseError> {
        Ok(scoped::select::<Properties>(scope)
            .filter(PropertyColumn::PropertyCode.eq(code))
            .filter(PropertyColumn::IsDeleted.eq(false))
            .one(self.db.get_connection())
            .await?)
    }

    /// Duplicate-code pre-check within the tenant scope. Soft-deleted rows
    /// keep their code reserved; the unique index includes them too.
    pub async fn code_exists(
        &self,
        scope: TenantScope,
        code: &str,
        exclude_id: Option<i32>,
    ) -> Result<bool, DatabaseError> {
        let mut query = scoped::select::<Properties>(scope)
            .filter(PropertyColumn::PropertyCode.eq(code));
        if let Some(id) = exclude_id {
            query = query.filter(PropertyColumn::Id.ne(id));
        }
        Ok(query.one(self.db.get_connection()).await?.is_some())
    }

    pub async fn list(
        &self,
        scope: TenantScope,
        params: ListParams<Properties>,
    ) -> Result<(Vec<Property>, u64), DatabaseError> {
        let params = params.filter(PropertyColumn::IsDeleted, false);
        Ok(scoped::list(self.db.get_connection(), scope, params).await?)
    }

    pub async fn update(
        &self,
        scope: TenantScope,
        id: i32,
        patch: PropertyPatch,
    ) -> Result<Option<Property>, DatabaseError> {
        let Some(existing) = self.find_by_id(scope, id).await? else {
            return Ok(None);
        };

        let mut model: PropertyActiveModel = existing.into();
        if let Some(v) = patch.property_name {
            model.property_name = Set(v);
        }
        if let Some(v) = patch.usage_type {
            model.usage_type = Set(v);
        }
        if let Some(v) = patch.address_line_1 {
            model.address_line_1 = Set(Some(v));
        }
        if let Some(v) = patch.city {
            model.city = Set(Some(v));
        }
        if let Some(v) = patch.country {
            model.country = Set(Some(v));
        }
        if let Some(v) = patch.total_floors {
            model.total_floors = Set(Some(v));
        }
        if let Some(v) = patch.year_built {
            model.year_built = Set(Some(v));
        }
        if let Some(v) = patch.status {
            model.status = Set(v);
        }
        if let Some(v) = patch.notes {
            model.notes = Set(Some(v));
        }
        model.updated_at = Set(Utc::now());

        Ok(Some(model.update(self.db.get_connection()).await?))
    }

    /// Soft delete. Returns false when the row does not exist in this scope
    /// (or was already deleted).
    pub async fn soft_delete(&self, scope: TenantScope, id: i32) -> Result<bool, DatabaseError> {
        let Some(existing) = self.find_by_id(scope, id).await? else {
            return Ok(false);
        };

        let mut model: PropertyActiveModel = existing.into();
        model.is_deleted = Set(true);
        model.updated_at = Set(Utc::now());
        model.update(self.db.get_connection()).await?;
        Ok(true)
    }
}

#[async_trait::async_trait(?Send)]
impl Repository for PropertyRepository {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Properties::find()
            .limit(1)
            .all(self.db.get_connection())
            .await?;
        Ok(())
    }
}
