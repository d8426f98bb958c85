//! Renter KYC document entity (tenant-scoped)

use crate::scoped::TenantScopedEntity;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "renter_documents")]
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
    /// Global FK to `document_types`.
    pub document_type_id: i32,
    pub file_ref: Option<String>,
    pub issued_at: Option<Date>,
    pub expires_at: Option<Date>,
    pub verification_status: DocumentVerificationStatus,
    pub verified_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum DocumentVerificationStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "verified")]
    Verified,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "expired")]
    Expired,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::document_types::Entity",
        from = "Column::DocumentTypeId",
        to = "super::document_types::Column::Id"
    )]
    DocumentType,
}

impl Related<super::document_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DocumentType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether the document is past its expiry date.
    pub fn is_expired(&self, today: Date) -> bool {
        matches!(self.expires_at, Some(expiry) if expiry < today)
    }
}

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
}
