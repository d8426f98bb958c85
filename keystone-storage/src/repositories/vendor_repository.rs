//! Vendor repository: tenant-scoped CRUD over vendors

use chrono::Utc;
use keystone_api_types::TenantScope;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set};
use uuid::Uuid;

use crate::allocator;
use crate::connection::{DatabaseConnection, DatabaseError};
use crate::entities::{Vendor, VendorActiveModel, VendorColumn, Vendors};
use crate::repositories::Repository;
use crate::scoped::{self, ListParams};

#[derive(Debug, Clone)]
pub struct NewVendor {
    pub vendor_code: String,
    pub vendor_name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct VendorPatch {
    pub vendor_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Clone)]
pub struct VendorRepository {
    db: DatabaseConnection,
}

impl VendorRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        scope: TenantScope,
        new: NewVendor,
    ) -> Result<Vendor, DatabaseError> {
        let now = Utc::now();
        allocator::insert_with_retry::<VendorActiveModel, _, _>(
            self.db.get_connection(),
            scope,
            |id| VendorActiveModel {
                account_id: Set(scope.account_id),
                company_id: Set(scope.company_id),
                id: Set(id),
                uuid: Set(Uuid::new_v4()),
                vendor_code: Set(new.vendor_code.clone()),
                vendor_name: Set(new.vendor_name.clone()),
                contact_email: Set(new.contact_email.clone()),
                contact_phone: Set(new.contact_phone.clone()),
                is_active: Set(true),
                created_at: Set(now),
                updated_at: Set(now),
            },
        )
        .await
    }

    pub async fn find_by_id(
        &self,
        scope: TenantScope,
        id: i32,
    ) -> Result<Option<Vendor>, DatabaseError> {
        Ok(scoped::get::<Vendors, _>(self.db.get_connection(), scope, id).await?)
    }

    pub async fn find_by_uuid(
        &self,
        scope: TenantScope,
        uuid: Uuid,
    ) -> Result<Option<Vendor>, DatabaseError> {
        Ok(scoped::get_by_uuid::<Vendors, _>(self.db.get_connection(), scope, uuid).await?)
    }

    pub async fn find_by_code(
        &self,
        scope: TenantScope,
        code: &str,
    ) -> Result<Option<Vendor>, DatabaseError> {
        Ok(scoped::select::<Vendors>(scope)
            .filter(VendorColumn::VendorCode.eq(code))
            .one(self.db.get_connection())
            .await?)
    }

    pub async fn code_exists(
        &self,
        scope: TenantScope,
        code: &str,
        exclude_id: Option<i32>,
    ) -> Result<bool, DatabaseError> {
        let mut query =
            scoped::select::<Vendors>(scope).filter(VendorColumn::VendorCode.eq(code));
        if let Some(id) = exclude_id {
            query = query.filter(VendorColumn::Id.ne(id));
        }
        Ok(query.one(self.db.get_connection()).await?.is_some())
    }

    pub async fn list(
        &self,
        scope: TenantScope,
        params: ListParams<Vendors>,
    ) -> Result<(Vec<Vendor>, u64), DatabaseError> {
        Ok(scoped::list(self.db.get_connection(), scope, params).await?)
    }

    pub async fn update(
        &self,
        scope: TenantScope,
        id: i32,
        patch: VendorPatch,
    ) -> Result<Option<Vendor>, DatabaseError> {
        let Some(existing) = self.find_by_id(scope, id).await? else {
            return Ok(None);
        };

        let mut model: VendorActiveModel = existing.into();
        if let Some(v) = patch.vendor_name {
            model.vendor_name = Set(v);
        }
        if let Some(v) = patch.contact_email {
            model.contact_email = Set(Some(v));
        }
        if let Some(v) = patch.contact_phone {
            model.contact_phone = Set(Some(v));
        }
        if let Some(v) = patch.is_active {
            model.is_active = Set(v);
        }
        model.updated_at = Set(Utc::now());

        Ok(Some(model.update(self.db.get_connection()).await?))
    }
}

#[async_trait::async_trait(?Send)]
impl Repository for VendorRepository {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Vendors::find()
            .limit(1)
            .all(self.db.get_connection())
            .await?;
        Ok(())
    }
}
