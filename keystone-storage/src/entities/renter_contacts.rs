//! Renter contact entity (tenant-scoped)

use crate::scoped::TenantScopedEntity;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "renter_contacts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub company_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub uuid: Uuid,
    /// Same-tenant renter.
    pub renter_id: i32,
    pub full_name: String,
    pub role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
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
        &[Column::FullName, Column::Email]
    }
}
