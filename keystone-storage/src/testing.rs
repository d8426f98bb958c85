//! Shared test fixtures: in-memory database, tenant scopes, and lookup
//! seed data. Used by this crate's unit tests and by the service-level
//! integration tests.

use crate::config::DatabaseConfig;
use crate::connection::{DatabaseConnection, DatabaseError};
use crate::entities::{
    AccountActiveModel, CompanyActiveModel, DocumentType, DocumentTypeActiveModel, RenterType,
    UnitCategory, UnitCategoryActiveModel,
};
use keystone_api_types::TenantScope;
use sea_orm::{ActiveModelBehavior, ActiveModelTrait, Set};

/// Fresh in-memory SQLite database with all migrations applied.
pub async fn create_test_db() -> Result<DatabaseConnection, DatabaseError> {
    let db = DatabaseConnection::new(DatabaseConfig::in_memory()).await?;
    db.migrate().await?;
    Ok(db)
}

/// Create an account/company pair and return its tenant scope.
pub async fn create_scope(
    db: &DatabaseConnection,
    account_name: &str,
    company_name: &str,
) -> Result<TenantScope, DatabaseError> {
    let account = AccountActiveModel {
        name: Set(account_name.to_string()),
        ..AccountActiveModel::new()
    }
    .insert(db.get_connection())
    .await?;

    let company = CompanyActiveModel {
        account_id: Set(account.id),
        name: Set(company_name.to_string()),
        ..CompanyActiveModel::new()
    }
    .insert(db.get_connection())
    .await?;

    Ok(TenantScope::new(account.id, company.id))
}

/// A second company under the same account, for cross-company isolation
/// tests.
pub async fn create_sibling_company(
    db: &DatabaseConnection,
    scope: TenantScope,
    company_name: &str,
) -> Result<TenantScope, DatabaseError> {
    let company = CompanyActiveModel {
        account_id: Set(scope.account_id),
        name: Set(company_name.to_string()),
        ..CompanyActiveModel::new()
    }
    .insert(db.get_connection())
    .await?;

    Ok(TenantScope::new(scope.account_id, company.id))
}

/// Seed the standard unit category tree used across hierarchy tests:
/// FLOOR at the root, APARTMENT and SHOP under FLOOR, BEDSPACE under
/// APARTMENT.
pub async fn seed_unit_categories(
    db: &DatabaseConnection,
) -> Result<Vec<UnitCategory>, DatabaseError> {
    let rows = [
        ("FLOOR", "Floor", true, true, None, 1),
        (
            "APARTMENT",
            "Apartment",
            true,
            false,
            Some(serde_json::json!(["FLOOR"])),
            2,
        ),
        (
            "BEDSPACE",
            "Bed space",
            true,
            false,
            Some(serde_json::json!(["APARTMENT"])),
            3,
        ),
        (
            "SHOP",
            "Shop",
            false,
            true,
            Some(serde_json::json!(["FLOOR"])),
            2,
        ),
    ];

    let mut out = Vec::with_capacity(rows.len());
    for (code, name, residential, commercial, allowed, depth) in rows {
        let model = UnitCategoryActiveModel {
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            description: Set(None),
            is_residential: Set(residential),
            is_commercial: Set(commercial),
            allowed_parent_categories: Set(allowed),
            max_depth: Set(depth),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(db.get_connection())
        .await?;
        out.push(model);
    }
    Ok(out)
}

/// Seed document types: a mandatory id document for everyone, a mandatory
/// trade license for entity renters, and an optional photo.
pub async fn seed_document_types(
    db: &DatabaseConnection,
) -> Result<Vec<DocumentType>, DatabaseError> {
    let rows = [
        ("NATIONAL_ID", "National ID", None, true, Some(24)),
        (
            "TRADE_LICENSE",
            "Trade license",
            Some(RenterType::Entity),
            true,
            Some(12),
        ),
        ("PHOTO", "Photo", None, false, None),
    ];

    let mut out = Vec::with_capacity(rows.len());
    for (code, name, applicable_to, mandatory, validity) in rows {
        let model = DocumentTypeActiveModel {
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            applicable_to: Set(applicable_to),
            is_mandatory: Set(mandatory),
            validity_months: Set(validity),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(db.get_connection())
        .await?;
        out.push(model);
    }
    Ok(out)
}
