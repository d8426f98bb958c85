//! Unit repository: tenant-scoped CRUD over the unit adjacency list
//!
//! Structural rules (depth, category allow-list, leaf maintenance) live in
//! the hierarchy service; this layer only moves rows. Mutations that take
//! part in multi-step structural changes accept a generic connection so the
//! service can run them inside one transaction.

use chrono::Utc;
use keystone_api_types::TenantScope;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::allocator;
use crate::connection::{DatabaseConnection, DatabaseError};
use crate::entities::{Unit, UnitActiveModel, UnitColumn, UnitStatus, Units};
use crate::repositories::Repository;
use crate::scoped::{self, ListParams};

#[derive(Debug, Clone)]
pub struct NewUnit {
    pub property_id: i32,
    pub parent_unit_id: Option<i32>,
    pub unit_code: String,
    pub display_name: Option<String>,
    pub category_id: i32,
    pub floor_number: Option<String>,
    pub area_sqm: Option<Decimal>,
    pub capacity: i32,
    pub notes: Option<String>,
}

/// Partial update; None leaves the field unchanged. Structure (property,
/// parent, category, code) does not move through here.
#[derive(Debug, Clone, Default)]
pub struct UnitPatch {
    pub display_name: Option<String>,
    pub floor_number: Option<String>,
    pub area_sqm: Option<Decimal>,
    pub capacity: Option<i32>,
    pub status: Option<UnitStatus>,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct UnitRepository {
    db: DatabaseConnection,
}

impl UnitRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert a unit. New units always start as leaves; the caller flips
    /// the parent's flag in the same transaction.
    pub async fn create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        new: NewUnit,
    ) -> Result<Unit, DatabaseError> {
        let now = Utc::now();
        allocator::insert_with_retry::<UnitActiveModel, _, _>(conn, scope, |id| UnitActiveModel {
            account_id: Set(scope.account_id),
            company_id: Set(scope.company_id),
            id: Set(id),
            uuid: Set(Uuid::new_v4()),
            property_id: Set(new.property_id),
            parent_unit_id: Set(new.parent_unit_id),
            unit_code: Set(new.unit_code.clone()),
            display_name: Set(new.display_name.clone()),
            category_id: Set(new.category_id),
            floor_number: Set(new.floor_number.clone()),
            area_sqm: Set(new.area_sqm),
            capacity: Set(new.capacity),
            is_leaf: Set(true),
            status: Set(UnitStatus::Available),
            notes: Set(new.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        })
        .await
    }

    pub async fn create(&self, scope: TenantScope, new: NewUnit) -> Result<Unit, DatabaseError> {
        self.create_in(self.db.get_connection(), scope, new).await
    }

    pub async fn find_by_id(
        &self,
        scope: TenantScope,
        id: i32,
    ) -> Result<Option<Unit>, DatabaseError> {
        self.find_by_id_in(self.db.get_connection(), scope, id).await
    }

    pub async fn find_by_id_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        id: i32,
    ) -> Result<Option<Unit>, DatabaseError> {
        Ok(scoped::get::<Units, _>(conn, scope, id).await?)
    }

    pub async fn find_by_uuid(
        &self,
        scope: TenantScope,
        uuid: Uuid,
    ) -> Result<Option<Unit>, DatabaseError> {
        Ok(scoped::get_by_uuid::<Units, _>(self.db.get_connection(), scope, uuid).await?)
    }

    /// Unit codes are unique per property within a scope.
    pub async fn code_exists(
        &self,
        scope: TenantScope,
        property_id: i32,
        code: &str,
        exclude_id: Option<i32>,
    ) -> Result<bool, DatabaseError> {
        let mut query = scoped::select::<Units>(scope)
            .filter(UnitColumn::PropertyId.eq(property_id))
            .filter(UnitColumn::UnitCode.eq(code));
        if let Some(id) = exclude_id {
            query = query.filter(UnitColumn::Id.ne(id));
        }
        Ok(query.one(self.db.get_connection()).await?.is_some())
    }

    pub async fn children_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        parent_id: i32,
    ) -> Result<Vec<Unit>, DatabaseError> {
        Ok(scoped::select::<Units>(scope)
            .filter(UnitColumn::ParentUnitId.eq(parent_id))
            .order_by_asc(UnitColumn::UnitCode)
            .all(conn)
            .await?)
    }

    pub async fn child_count_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        parent_id: i32,
    ) -> Result<u64, DatabaseError> {
        Ok(scoped::select::<Units>(scope)
            .filter(UnitColumn::ParentUnitId.eq(parent_id))
            .count(conn)
            .await?)
    }

    /// Every unit of a property, ordered by `unit_code` so that tree
    /// rendering is stable.
    pub async fn units_of_property(
        &self,
        scope: TenantScope,
        property_id: i32,
    ) -> Result<Vec<Unit>, DatabaseError> {
        Ok(scoped::select::<Units>(scope)
            .filter(UnitColumn::PropertyId.eq(property_id))
            .order_by_asc(UnitColumn::UnitCode)
            .all(self.db.get_connection())
            .await?)
    }

    pub async fn property_unit_count(
        &self,
        scope: TenantScope,
        property_id: i32,
    ) -> Result<u64, DatabaseError> {
        Ok(scoped::count::<Units, _>(
            self.db.get_connection(),
            scope,
            vec![(UnitColumn::PropertyId, property_id.into())],
        )
        .await?)
    }

    pub async fn list(
        &self,
        scope: TenantScope,
        params: ListParams<Units>,
    ) -> Result<(Vec<Unit>, u64), DatabaseError> {
        Ok(scoped::list(self.db.get_connection(), scope, params).await?)
    }

    pub async fn update_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        id: i32,
        patch: UnitPatch,
    ) -> Result<Option<Unit>, DatabaseError> {
        let Some(existing) = self.find_by_id_in(conn, scope, id).await? else {
            return Ok(None);
        };

        let mut model: UnitActiveModel = existing.into();
        if let Some(v) = patch.display_name {
            model.display_name = Set(Some(v));
        }
        if let Some(v) = patch.floor_number {
            model.floor_number = Set(Some(v));
        }
        if let Some(v) = patch.area_sqm {
            model.area_sqm = Set(Some(v));
        }
        if let Some(v) = patch.capacity {
            model.capacity = Set(v);
        }
        if let Some(v) = patch.status {
            model.status = Set(v);
        }
        if let Some(v) = patch.notes {
            model.notes = Set(Some(v));
        }
        model.updated_at = Set(Utc::now());

        Ok(Some(model.update(conn).await?))
    }

    pub async fn update(
        &self,
        scope: TenantScope,
        id: i32,
        patch: UnitPatch,
    ) -> Result<Option<Unit>, DatabaseError> {
        self.update_in(self.db.get_connection(), scope, id, patch).await
    }

    /// Re-home a unit under a new parent (None moves it to the root). The
    /// hierarchy service has already validated the move.
    pub async fn set_parent_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        id: i32,
        parent_unit_id: Option<i32>,
    ) -> Result<(), DatabaseError> {
        let Some(existing) = self.find_by_id_in(conn, scope, id).await? else {
            return Ok(());
        };
        let mut model: UnitActiveModel = existing.into();
        model.parent_unit_id = Set(parent_unit_id);
        model.updated_at = Set(Utc::now());
        model.update(conn).await?;
        Ok(())
    }

    pub async fn set_category_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        id: i32,
        category_id: i32,
    ) -> Result<(), DatabaseError> {
        let Some(existing) = self.find_by_id_in(conn, scope, id).await? else {
            return Ok(());
        };
        let mut model: UnitActiveModel = existing.into();
        model.category_id = Set(category_id);
        model.updated_at = Set(Utc::now());
        model.update(conn).await?;
        Ok(())
    }

    pub async fn set_leaf_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        id: i32,
        is_leaf: bool,
    ) -> Result<(), DatabaseError> {
        let Some(existing) = self.find_by_id_in(conn, scope, id).await? else {
            return Ok(());
        };
        if existing.is_leaf == is_leaf {
            return Ok(());
        }
        let mut model: UnitActiveModel = existing.into();
        model.is_leaf = Set(is_leaf);
        model.updated_at = Set(Utc::now());
        model.update(conn).await?;
        Ok(())
    }

    pub async fn delete_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        id: i32,
    ) -> Result<bool, DatabaseError> {
        let result = Units::delete_many()
            .filter(UnitColumn::AccountId.eq(scope.account_id))
            .filter(UnitColumn::CompanyId.eq(scope.company_id))
            .filter(UnitColumn::Id.eq(id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

#[async_trait::async_trait(?Send)]
impl Repository for UnitRepository {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Units::find()
            .limit(1)
            .all(self.db.get_connection())
            .await?;
        Ok(())
    }
}
