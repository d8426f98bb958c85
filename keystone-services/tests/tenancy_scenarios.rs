//! Tenant isolation scenarios across the service layer

use keystone_api_types::{ApiError, TenantScope};
use keystone_storage::entities::PropertyUsageType;
use keystone_storage::repositories::{NewProperty, NewVendor, RepositoryFactory};
use keystone_storage::testing::{create_scope, create_sibling_company, create_test_db};
use keystone_storage::ListParams;
use keystone_services::{PropertyService, VendorService};

async fn setup() -> (RepositoryFactory, TenantScope, TenantScope) {
    let db = create_test_db().await.unwrap();
    let scope = create_scope(&db, "acme", "Acme Dubai").await.unwrap();
    let sibling = create_sibling_company(&db, scope, "Acme Abu Dhabi")
        .await
        .unwrap();
    (RepositoryFactory::new(db), scope, sibling)
}

fn new_property(code: &str) -> NewProperty {
    NewProperty {
        property_code: code.to_string(),
        property_name: format!("Property {code}"),
        usage_type: PropertyUsageType::Residential,
        address_line_1: None,
        city: None,
        country: None,
        total_floors: None,
        year_built: None,
        notes: None,
    }
}

#[tokio::test]
async fn property_ids_restart_per_company() {
    let (repos, scope, sibling) = setup().await;
    let service = PropertyService::new(repos);

    let first = service.create_property(scope, new_property("P-001")).await.unwrap();
    let second = service.create_property(scope, new_property("P-002")).await.unwrap();
    assert_eq!((first.id, second.id), (1, 2));

    let other = service
        .create_property(sibling, new_property("P-001"))
        .await
        .unwrap();
    assert_eq!(other.id, 1);
}

#[tokio::test]
async fn cross_tenant_lookup_reads_as_absent() {
    let (repos, scope, sibling) = setup().await;
    let service = PropertyService::new(repos);

    let property = service.create_property(scope, new_property("P-001")).await.unwrap();

    let err = service.get_property(sibling, property.id).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
    let err = service
        .get_property_by_uuid(sibling, property.uuid)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
}

#[tokio::test]
async fn cross_tenant_list_is_empty_with_zero_total() {
    let (repos, scope, sibling) = setup().await;
    let service = PropertyService::new(repos);

    for code in ["P-001", "P-002", "P-003"] {
        service.create_property(scope, new_property(code)).await.unwrap();
    }

    let mine = service
        .list_properties(scope, ListParams::default())
        .await
        .unwrap();
    assert_eq!(mine.total, 3);

    let theirs = service
        .list_properties(sibling, ListParams::default())
        .await
        .unwrap();
    assert!(theirs.items.is_empty());
    assert_eq!(theirs.total, 0);
}

#[tokio::test]
async fn vendor_code_duplicate_only_within_tenant() {
    let (repos, scope, sibling) = setup().await;
    let service = VendorService::new(repos);

    let vendor = NewVendor {
        vendor_code: "VEN-001".to_string(),
        vendor_name: "Gulf Cleaning".to_string(),
        contact_email: None,
        contact_phone: None,
    };

    service.create_vendor(scope, vendor.clone()).await.unwrap();

    let err = service.create_vendor(scope, vendor.clone()).await.unwrap_err();
    assert!(matches!(err, ApiError::Conflict { .. }));
    assert_eq!(
        err.to_string(),
        "Vendor with identifier 'VEN-001' already exists"
    );

    // The sibling company is free to use the same code.
    let other = service.create_vendor(sibling, vendor).await.unwrap();
    assert_eq!(other.id, 1);
}

#[tokio::test]
async fn update_in_foreign_scope_is_not_found() {
    let (repos, scope, sibling) = setup().await;
    let service = PropertyService::new(repos);

    let property = service.create_property(scope, new_property("P-001")).await.unwrap();

    let err = service
        .update_property(sibling, property.id, Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));

    // The row in the owning scope is untouched.
    let unchanged = service.get_property(scope, property.id).await.unwrap();
    assert_eq!(unchanged.property_name, "Property P-001");
}
