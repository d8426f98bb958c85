//! Unit entity (tenant-scoped, self-referential hierarchy)
//!
//! Units form a forest per property via `parent_unit_id` (adjacency list).
//! The parent/child relation is kept at the application level: the
//! self-referencing composite FK would need `SET NULL` on a NOT NULL column
//! on some engines, so the hierarchy engine owns the integrity rules.
//! `is_leaf` is a maintained cache of "has no children", recomputed on every
//! structural mutation.

use crate::scoped::TenantScopedEntity;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "units")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub company_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub uuid: Uuid,
    /// Same-tenant property this unit belongs to.
    pub property_id: i32,
    /// Same-tenant, same-property parent unit; None for roots.
    pub parent_unit_id: Option<i32>,
    /// Business key, unique within the tenant scope and property.
    pub unit_code: String,
    pub display_name: Option<String>,
    /// Global FK to `unit_categories`.
    pub category_id: i32,
    pub floor_number: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub area_sqm: Option<Decimal>,
    pub capacity: i32,
    pub is_leaf: bool,
    pub status: UnitStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum UnitStatus {
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "occupied")]
    Occupied,
    #[sea_orm(string_value = "reserved")]
    Reserved,
    #[sea_orm(string_value = "under_maintenance")]
    UnderMaintenance,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::unit_categories::Entity",
        from = "Column::CategoryId",
        to = "super::unit_categories::Column::Id"
    )]
    Category,
}

impl Related<super::unit_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TenantScopedEntity for Entity {
    fn account_id_col() -> Column {
        Column::AccountId
    }
    fn company_id_col() -> Column {
        Column::CompanyId
    }
    fn id_col() -> Column {
        Column::Id
    }
    fn uuid_col() -> Column {
        Column::Uuid
    }
    fn created_at_col() -> Column {
        Column::CreatedAt
    }
    fn search_columns() -> &'static [Column] {
        &[Column::UnitCode, Column::DisplayName]
    }
}
