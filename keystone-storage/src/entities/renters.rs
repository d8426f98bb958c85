//! Renter entity (tenant-scoped)
//!
//! "Renter" is the occupant-tenant of a unit, named to avoid colliding with
//! the SaaS tenant concept. `kyc_status` is derived from the verification
//! state of the renter's mandatory documents; it is persisted as a cache and
//! recomputed by the KYC service, never set directly by callers.

use crate::scoped::TenantScopedEntity;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "renters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub company_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub uuid: Uuid,
    /// Business key, unique within the tenant scope.
    pub tenant_code: String,
    pub renter_type: RenterType,
    pub display_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub kyc_status: KycStatus,
    pub kyc_verified_at: Option<DateTime<Utc>>,
    pub status: RenterStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum RenterType {
    #[sea_orm(string_value = "individual")]
    Individual,
    #[sea_orm(string_value = "entity")]
    Entity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum KycStatus {
    #[sea_orm(string_value = "not_started")]
    NotStarted,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "verified")]
    Verified,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "expired")]
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum RenterStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "blacklisted")]
    Blacklisted,
}

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
        &[Column::TenantCode, Column::DisplayName, Column::Email]
    }
}
