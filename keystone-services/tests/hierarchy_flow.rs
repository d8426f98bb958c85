//! Unit hierarchy scenarios: leaf maintenance, depth bound, categories

use keystone_api_types::{ApiError, TenantScope};
use keystone_storage::entities::{PropertyUsageType, UnitCategory};
use keystone_storage::repositories::{NewProperty, RepositoryFactory, UnitPatch};
use keystone_storage::testing::{create_scope, create_test_db, seed_unit_categories};
use keystone_services::{CreateUnit, HierarchyService, PropertyService, UpdateUnit};

struct Fixture {
    hierarchy: HierarchyService,
    properties: PropertyService,
    scope: TenantScope,
    property_id: i32,
    categories: Vec<UnitCategory>,
}

impl Fixture {
    fn category(&self, code: &str) -> i32 {
        self.categories.iter().find(|c| c.code == code).unwrap().id
    }

    fn unit(&self, code: &str, category: &str, parent: Option<i32>) -> CreateUnit {
        CreateUnit {
            property_id: self.property_id,
            parent_unit_id: parent,
            unit_code: code.to_string(),
            display_name: None,
            category_id: self.category(category),
            floor_number: None,
            area_sqm: None,
            capacity: 1,
            notes: None,
        }
    }
}

async fn setup() -> Fixture {
    let db = create_test_db().await.unwrap();
    let scope = create_scope(&db, "acme", "Acme Dubai").await.unwrap();
    let categories = seed_unit_categories(&db).await.unwrap();
    let repos = RepositoryFactory::new(db);
    let properties = PropertyService::new(repos.clone());
    let hierarchy = HierarchyService::new(repos);

    let property = properties
        .create_property(
            scope,
            NewProperty {
                property_code: "P-001".to_string(),
                property_name: "Marina Tower".to_string(),
                usage_type: PropertyUsageType::Residential,
                address_line_1: None,
                city: None,
                country: None,
                total_floors: Some(4),
                year_built: None,
                notes: None,
            },
        )
        .await
        .unwrap();

    Fixture {
        hierarchy,
        properties,
        scope,
        property_id: property.id,
        categories,
    }
}

#[tokio::test]
async fn first_child_flips_parent_leaf_flag() {
    let f = setup().await;

    let floor = f
        .hierarchy
        .create_unit(f.scope, f.unit("Floor-1", "FLOOR", None))
        .await
        .unwrap();
    assert!(floor.is_leaf);

    let apartment = f
        .hierarchy
        .create_unit(f.scope, f.unit("Apt-101", "APARTMENT", Some(floor.id)))
        .await
        .unwrap();
    assert!(apartment.is_leaf);

    let floor = f.hierarchy.get_unit(f.scope, floor.id).await.unwrap();
    assert!(!floor.is_leaf);
}

#[tokio::test]
async fn depth_is_bounded_at_three_levels() {
    let f = setup().await;

    let floor = f
        .hierarchy
        .create_unit(f.scope, f.unit("Floor-1", "FLOOR", None))
        .await
        .unwrap();
    let apartment = f
        .hierarchy
        .create_unit(f.scope, f.unit("Apt-101", "APARTMENT", Some(floor.id)))
        .await
        .unwrap();
    // Depth 3 is fine.
    let bed = f
        .hierarchy
        .create_unit(f.scope, f.unit("Bed-A", "BEDSPACE", Some(apartment.id)))
        .await
        .unwrap();

    // Depth 4 is not, regardless of category rules.
    let err = f
        .hierarchy
        .create_unit(f.scope, f.unit("Bed-B", "BEDSPACE", Some(bed.id)))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation { .. }));
}

#[tokio::test]
async fn category_allow_list_is_enforced() {
    let f = setup().await;

    // APARTMENT cannot sit at the root.
    let err = f
        .hierarchy
        .create_unit(f.scope, f.unit("Apt-101", "APARTMENT", None))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("requires a parent"));

    let floor = f
        .hierarchy
        .create_unit(f.scope, f.unit("Floor-1", "FLOOR", None))
        .await
        .unwrap();
    let apartment = f
        .hierarchy
        .create_unit(f.scope, f.unit("Apt-101", "APARTMENT", Some(floor.id)))
        .await
        .unwrap();

    // SHOP accepts FLOOR as a parent but not APARTMENT.
    let err = f
        .hierarchy
        .create_unit(f.scope, f.unit("Shop-1", "SHOP", Some(apartment.id)))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("allowed parents"));
    f.hierarchy
        .create_unit(f.scope, f.unit("Shop-1", "SHOP", Some(floor.id)))
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_is_blocked_by_children_then_restores_leaf() {
    let f = setup().await;

    let floor = f
        .hierarchy
        .create_unit(f.scope, f.unit("Floor-1", "FLOOR", None))
        .await
        .unwrap();
    let apartment = f
        .hierarchy
        .create_unit(f.scope, f.unit("Apt-101", "APARTMENT", Some(floor.id)))
        .await
        .unwrap();

    let err = f.hierarchy.delete_unit(f.scope, floor.id).await.unwrap_err();
    assert!(err.to_string().contains("child units"));

    f.hierarchy.delete_unit(f.scope, apartment.id).await.unwrap();
    let floor = f.hierarchy.get_unit(f.scope, floor.id).await.unwrap();
    assert!(floor.is_leaf);

    f.hierarchy.delete_unit(f.scope, floor.id).await.unwrap();
}

#[tokio::test]
async fn duplicate_unit_code_within_property_is_rejected() {
    let f = setup().await;

    f.hierarchy
        .create_unit(f.scope, f.unit("Floor-1", "FLOOR", None))
        .await
        .unwrap();
    let err = f
        .hierarchy
        .create_unit(f.scope, f.unit("Floor-1", "FLOOR", None))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict { .. }));
}

#[tokio::test]
async fn hierarchy_tree_and_full_path() {
    let f = setup().await;

    let floor = f
        .hierarchy
        .create_unit(f.scope, f.unit("Floor-1", "FLOOR", None))
        .await
        .unwrap();
    let apt_2 = f
        .hierarchy
        .create_unit(f.scope, f.unit("Apt-102", "APARTMENT", Some(floor.id)))
        .await
        .unwrap();
    let apt_1 = f
        .hierarchy
        .create_unit(f.scope, f.unit("Apt-101", "APARTMENT", Some(floor.id)))
        .await
        .unwrap();
    let bed = f
        .hierarchy
        .create_unit(f.scope, f.unit("Bed-A", "BEDSPACE", Some(apt_1.id)))
        .await
        .unwrap();

    let tree = f.hierarchy.build_hierarchy(f.scope, f.property_id).await.unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].unit.id, floor.id);
    // Siblings come back ordered by unit_code, not creation order.
    let child_ids: Vec<i32> = tree[0].children.iter().map(|n| n.unit.id).collect();
    assert_eq!(child_ids, vec![apt_1.id, apt_2.id]);
    assert_eq!(tree[0].children[0].children[0].unit.id, bed.id);

    let path = f.hierarchy.full_path(f.scope, bed.id).await.unwrap();
    assert_eq!(path, "Marina Tower → Floor-1 → Apt-101 → Bed-A");
}

#[tokio::test]
async fn leasable_units_are_available_leaves() {
    let f = setup().await;

    let floor = f
        .hierarchy
        .create_unit(f.scope, f.unit("Floor-1", "FLOOR", None))
        .await
        .unwrap();
    let apartment = f
        .hierarchy
        .create_unit(f.scope, f.unit("Apt-101", "APARTMENT", Some(floor.id)))
        .await
        .unwrap();

    let leasable = f
        .hierarchy
        .leasable_units(f.scope, Some(f.property_id), None)
        .await
        .unwrap();
    // The floor has a child, so only the apartment is leasable.
    assert_eq!(leasable.len(), 1);
    assert_eq!(leasable[0].unit.id, apartment.id);
    assert_eq!(leasable[0].full_path, "Marina Tower → Floor-1 → Apt-101");
}

#[tokio::test]
async fn reparenting_recomputes_both_leaf_flags() {
    let f = setup().await;

    let floor_1 = f
        .hierarchy
        .create_unit(f.scope, f.unit("Floor-1", "FLOOR", None))
        .await
        .unwrap();
    let floor_2 = f
        .hierarchy
        .create_unit(f.scope, f.unit("Floor-2", "FLOOR", None))
        .await
        .unwrap();
    let apartment = f
        .hierarchy
        .create_unit(f.scope, f.unit("Apt-101", "APARTMENT", Some(floor_1.id)))
        .await
        .unwrap();

    f.hierarchy
        .update_unit(
            f.scope,
            apartment.id,
            UpdateUnit {
                parent_unit_id: Some(Some(floor_2.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let floor_1 = f.hierarchy.get_unit(f.scope, floor_1.id).await.unwrap();
    let floor_2 = f.hierarchy.get_unit(f.scope, floor_2.id).await.unwrap();
    assert!(floor_1.is_leaf);
    assert!(!floor_2.is_leaf);
}

#[tokio::test]
async fn reparent_and_rename_land_together() {
    let f = setup().await;

    let floor_1 = f
        .hierarchy
        .create_unit(f.scope, f.unit("Floor-1", "FLOOR", None))
        .await
        .unwrap();
    let floor_2 = f
        .hierarchy
        .create_unit(f.scope, f.unit("Floor-2", "FLOOR", None))
        .await
        .unwrap();
    let apartment = f
        .hierarchy
        .create_unit(f.scope, f.unit("Apt-101", "APARTMENT", Some(floor_1.id)))
        .await
        .unwrap();

    let updated = f
        .hierarchy
        .update_unit(
            f.scope,
            apartment.id,
            UpdateUnit {
                parent_unit_id: Some(Some(floor_2.id)),
                patch: UnitPatch {
                    display_name: Some("Corner flat".to_string()),
                    ..Default::default()
                },
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.parent_unit_id, Some(floor_2.id));
    assert_eq!(updated.display_name.as_deref(), Some("Corner flat"));
}

#[tokio::test]
async fn property_delete_is_blocked_while_units_exist() {
    let f = setup().await;

    let floor = f
        .hierarchy
        .create_unit(f.scope, f.unit("Floor-1", "FLOOR", None))
        .await
        .unwrap();

    let err = f
        .properties
        .delete_property(f.scope, f.property_id)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("has units"));

    f.hierarchy.delete_unit(f.scope, floor.id).await.unwrap();
    f.properties.delete_property(f.scope, f.property_id).await.unwrap();
}
