//! Vendor lease lifecycle scenarios

use chrono::NaiveDate;
use keystone_api_types::{ApiError, TenantScope};
use keystone_storage::entities::{
    CoverageScope, LeaseStatus, PropertyUsageType,
};
use keystone_storage::repositories::{
    LeasePatch, NewLease, NewProperty, NewVendor, RepositoryFactory,
};
use keystone_storage::testing::{create_scope, create_test_db, seed_unit_categories};
use keystone_services::{
    AddTerm, CoverageInput, CreateUnit, HierarchyService, LeasingService, PropertyService,
    VendorService,
};
use rust_decimal::Decimal;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn rent(amount: i64) -> Decimal {
    Decimal::new(amount * 100, 2)
}

struct Fixture {
    leasing: LeasingService,
    hierarchy: HierarchyService,
    scope: TenantScope,
    vendor_id: i32,
    property_id: i32,
    floor_category: i32,
}

impl Fixture {
    fn lease(&self, code: &str) -> NewLease {
        NewLease {
            vendor_id: self.vendor_id,
            lease_code: code.to_string(),
            start_date: date(2026, 1, 1),
            end_date: date(2026, 12, 31),
            rent_amount: rent(2500),
            currency: "AED".to_string(),
            billing_cycle: keystone_storage::entities::BillingCycle::Monthly,
            security_deposit: None,
            notes: None,
        }
    }

    fn property_coverage(&self) -> CoverageInput {
        CoverageInput {
            scope_type: CoverageScope::Property,
            property_id: Some(self.property_id),
            unit_id: None,
        }
    }
}

async fn setup() -> Fixture {
    let db = create_test_db().await.unwrap();
    let scope = create_scope(&db, "acme", "Acme Dubai").await.unwrap();
    let categories = seed_unit_categories(&db).await.unwrap();
    let floor_category = categories.iter().find(|c| c.code == "FLOOR").unwrap().id;
    let repos = RepositoryFactory::new(db);

    let vendor = VendorService::new(repos.clone())
        .create_vendor(
            scope,
            NewVendor {
                vendor_code: "VEN-001".to_string(),
                vendor_name: "Gulf Cleaning".to_string(),
                contact_email: None,
                contact_phone: None,
            },
        )
        .await
        .unwrap();

    let property = PropertyService::new(repos.clone())
        .create_property(
            scope,
            NewProperty {
                property_code: "P-001".to_string(),
                property_name: "Marina Tower".to_string(),
                usage_type: PropertyUsageType::Residential,
                address_line_1: None,
                city: None,
                country: None,
                total_floors: None,
                year_built: None,
                notes: None,
            },
        )
        .await
        .unwrap();

    Fixture {
        leasing: LeasingService::new(repos.clone()),
        hierarchy: HierarchyService::new(repos),
        scope,
        vendor_id: vendor.id,
        property_id: property.id,
        floor_category,
    }
}

#[tokio::test]
async fn activation_requires_coverage_and_creates_initial_term() {
    let f = setup().await;
    let lease = f.leasing.create_lease(f.scope, f.lease("L-001")).await.unwrap();
    assert_eq!(lease.status, LeaseStatus::Draft);

    // No coverage yet: activation refused.
    let err = f.leasing.activate_lease(f.scope, lease.id).await.unwrap_err();
    assert!(err.to_string().contains("cover at least one"));

    f.leasing
        .add_coverage(f.scope, lease.id, f.property_coverage())
        .await
        .unwrap();
    let active = f.leasing.activate_lease(f.scope, lease.id).await.unwrap();
    assert_eq!(active.status, LeaseStatus::Active);

    let terms = f.leasing.list_terms(f.scope, lease.id).await.unwrap();
    assert_eq!(terms.len(), 1);
    assert_eq!(terms[0].term_number, 1);
    assert_eq!(terms[0].reason.as_deref(), Some("Initial term"));
    assert_eq!(terms[0].rent_amount, lease.rent_amount);
}

#[tokio::test]
async fn drafts_are_editable_active_leases_are_not() {
    let f = setup().await;
    let lease = f.leasing.create_lease(f.scope, f.lease("L-001")).await.unwrap();

    let updated = f
        .leasing
        .update_lease(
            f.scope,
            lease.id,
            LeasePatch {
                rent_amount: Some(rent(3000)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.rent_amount, rent(3000));

    f.leasing
        .add_coverage(f.scope, lease.id, f.property_coverage())
        .await
        .unwrap();
    f.leasing.activate_lease(f.scope, lease.id).await.unwrap();

    let err = f
        .leasing
        .update_lease(f.scope, lease.id, LeasePatch::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("DRAFT"));
}

#[tokio::test]
async fn term_numbers_are_contiguous_and_extend_the_lease() {
    let f = setup().await;
    let lease = f.leasing.create_lease(f.scope, f.lease("L-001")).await.unwrap();
    f.leasing
        .add_coverage(f.scope, lease.id, f.property_coverage())
        .await
        .unwrap();
    f.leasing.activate_lease(f.scope, lease.id).await.unwrap();

    // Term 3 before term 2 is rejected.
    let err = f
        .leasing
        .add_term(
            f.scope,
            lease.id,
            AddTerm {
                term_number: 3,
                start_date: date(2027, 1, 1),
                end_date: date(2027, 12, 31),
                rent_amount: rent(2600),
                reason: Some("Renewal".to_string()),
            },
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("must be 2"));

    f.leasing
        .add_term(
            f.scope,
            lease.id,
            AddTerm {
                term_number: 2,
                start_date: date(2027, 1, 1),
                end_date: date(2027, 12, 31),
                rent_amount: rent(2600),
                reason: Some("Renewal".to_string()),
            },
        )
        .await
        .unwrap();

    let lease = f.leasing.get_lease(f.scope, lease.id).await.unwrap();
    assert_eq!(lease.end_date, date(2027, 12, 31));
    assert_eq!(lease.rent_amount, rent(2600));
}

#[tokio::test]
async fn unit_coverage_derives_property_and_rejects_duplicates() {
    let f = setup().await;
    let unit = f
        .hierarchy
        .create_unit(
            f.scope,
            CreateUnit {
                property_id: f.property_id,
                parent_unit_id: None,
                unit_code: "Floor-1".to_string(),
                display_name: None,
                category_id: f.floor_category,
                floor_number: None,
                area_sqm: None,
                capacity: 1,
                notes: None,
            },
        )
        .await
        .unwrap();

    let lease = f.leasing.create_lease(f.scope, f.lease("L-001")).await.unwrap();
    let coverage = f
        .leasing
        .add_coverage(
            f.scope,
            lease.id,
            CoverageInput {
                scope_type: CoverageScope::Unit,
                property_id: None,
                unit_id: Some(unit.id),
            },
        )
        .await
        .unwrap();
    assert_eq!(coverage.property_id, f.property_id);
    assert_eq!(coverage.unit_id, Some(unit.id));

    let err = f
        .leasing
        .add_coverage(
            f.scope,
            lease.id,
            CoverageInput {
                scope_type: CoverageScope::Unit,
                property_id: None,
                unit_id: Some(unit.id),
            },
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already exists"));

    // A unit covered by an open lease blocks unit deletion.
    let err = f.hierarchy.delete_unit(f.scope, unit.id).await.unwrap_err();
    assert!(err.to_string().contains("open vendor lease"));
}

#[tokio::test]
async fn coverage_removal_is_draft_only() {
    let f = setup().await;
    let lease = f.leasing.create_lease(f.scope, f.lease("L-001")).await.unwrap();
    let coverage = f
        .leasing
        .add_coverage(f.scope, lease.id, f.property_coverage())
        .await
        .unwrap();

    f.leasing
        .remove_coverage(f.scope, lease.id, coverage.id)
        .await
        .unwrap();

    let coverage = f
        .leasing
        .add_coverage(f.scope, lease.id, f.property_coverage())
        .await
        .unwrap();
    f.leasing.activate_lease(f.scope, lease.id).await.unwrap();

    let err = f
        .leasing
        .remove_coverage(f.scope, lease.id, coverage.id)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("DRAFT"));
}

#[tokio::test]
async fn terminate_then_delete() {
    let f = setup().await;
    let lease = f.leasing.create_lease(f.scope, f.lease("L-001")).await.unwrap();
    f.leasing
        .add_coverage(f.scope, lease.id, f.property_coverage())
        .await
        .unwrap();
    f.leasing.activate_lease(f.scope, lease.id).await.unwrap();

    // Active leases cannot be deleted outright.
    let err = f.leasing.delete_lease(f.scope, lease.id).await.unwrap_err();
    assert!(err.to_string().contains("ACTIVE"));

    let terminated = f
        .leasing
        .terminate_lease(f.scope, lease.id, "contract ended".to_string())
        .await
        .unwrap();
    assert_eq!(terminated.status, LeaseStatus::Terminated);
    assert_eq!(
        terminated.termination_reason.as_deref(),
        Some("contract ended")
    );

    // Double termination is rejected, deletion now goes through.
    let err = f
        .leasing
        .terminate_lease(f.scope, lease.id, "again".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation { .. }));

    f.leasing.delete_lease(f.scope, lease.id).await.unwrap();
    let err = f.leasing.get_lease(f.scope, lease.id).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
}

#[tokio::test]
async fn lease_dates_must_be_ordered() {
    let f = setup().await;
    let mut bad = f.lease("L-001");
    bad.end_date = date(2025, 12, 31);

    let err = f.leasing.create_lease(f.scope, bad).await.unwrap_err();
    assert!(err.to_string().contains("end date"));
}
