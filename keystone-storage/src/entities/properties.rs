//! Property entity (tenant-scoped)

use crate::scoped::TenantScopedEntity;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "properties")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub company_id: i32,
    /// Tenant-local id, assigned by the allocator. Unique only within
    /// `(account_id, company_id)`.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub uuid: Uuid,
    /// Business key, unique within the tenant scope.
    pub property_code: String,
    pub property_name: String,
    pub usage_type: PropertyUsageType,
    pub address_line_1: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub total_floors: Option<i32>,
    pub year_built: Option<i32>,
    pub status: PropertyStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum PropertyUsageType {
    #[sea_orm(string_value = "residential")]
    Residential,
    #[sea_orm(string_value = "commercial")]
    Commercial,
    #[sea_orm(string_value = "mixed")]
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum PropertyStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "under_maintenance")]
    UnderMaintenance,
}

// Unit rows reference properties through the three-leg composite key; the
// relation is enforced in the schema and resolved at the repository level.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

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
        &[Column::PropertyCode, Column::PropertyName, Column::City]
    }
}
