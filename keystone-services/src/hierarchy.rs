//! Unit hierarchy engine
//!
//! Units form a forest per property (floor → apartment → bed space, or any
//! other arrangement the category allow-lists permit) bounded at
//! [`MAX_UNIT_DEPTH`] levels. This service owns the structural rules:
//! category compatibility, depth, cycle rejection, and the maintained
//! `is_leaf` flag, which is always re-derived from a live child count inside
//! the mutating transaction rather than toggled blindly.

use std::collections::{HashMap, HashSet};

use keystone_api_types::{ApiError, ApiResult, TenantScope};
use keystone_storage::entities::{Unit, UnitCategory, UnitColumn, UnitStatus, Units};
use keystone_storage::repositories::{NewUnit, RepositoryFactory, UnitPatch};
use keystone_storage::{scoped, DatabaseError};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait};
use serde::Serialize;
use tracing::info;

/// Maximum number of levels in a unit tree (a root unit has depth 1).
pub const MAX_UNIT_DEPTH: i32 = 3;

#[derive(Debug, Clone)]
pub struct CreateUnit {
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

/// Structural and descriptive changes to a unit. `parent_unit_id` is
/// doubly optional: None leaves the parent alone, Some(None) moves the unit
/// to the root.
#[derive(Debug, Clone, Default)]
pub struct UpdateUnit {
    pub parent_unit_id: Option<Option<i32>>,
    pub category_id: Option<i32>,
    pub patch: UnitPatch,
}

/// A unit with its children, as returned by [`HierarchyService::build_hierarchy`].
#[derive(Debug, Clone, Serialize)]
pub struct UnitTree {
    pub unit: Unit,
    pub children: Vec<UnitTree>,
}

/// A leaf unit available for occupancy, with its rendered path.
#[derive(Debug, Clone, Serialize)]
pub struct LeasableUnit {
    pub unit: Unit,
    pub full_path: String,
}

#[derive(Clone)]
pub struct HierarchyService {
    repos: RepositoryFactory,
}

impl HierarchyService {
    pub fn new(repos: RepositoryFactory) -> Self {
        Self { repos }
    }

    /// Depth of a unit: 1 for a root, parent depth + 1 otherwise. Walks the
    /// parent chain with a visited set; a repeated id means the stored
    /// adjacency list is corrupt.
    pub async fn unit_depth<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        unit: &Unit,
    ) -> ApiResult<i32> {
        let mut depth = 1;
        let mut visited = HashSet::from([unit.id]);
        let mut cursor = unit.parent_unit_id;
        while let Some(parent_id) = cursor {
            if !visited.insert(parent_id) {
                return Err(ApiError::validation("unit hierarchy contains a cycle"));
            }
            depth += 1;
            if depth > MAX_UNIT_DEPTH {
                return Err(ApiError::validation(format!(
                    "unit hierarchy exceeds the maximum depth of {MAX_UNIT_DEPTH}"
                )));
            }
            let parent = self
                .repos
                .units
                .find_by_id_in(conn, scope, parent_id)
                .await?
                .ok_or_else(|| ApiError::not_found("Unit", parent_id))?;
            cursor = parent.parent_unit_id;
        }
        Ok(depth)
    }

    /// Category allow-list check. An empty list pins the category to the
    /// root; a non-empty list requires a parent whose category code is in
    /// the list.
    pub fn validate_category_parent(
        category: &UnitCategory,
        parent_category: Option<&UnitCategory>,
    ) -> ApiResult<()> {
        let allowed = category.allowed_parents();
        match (allowed.is_empty(), parent_category) {
            (true, None) => Ok(()),
            (true, Some(parent)) => Err(ApiError::validation(format!(
                "category '{}' must be at the root of the hierarchy, not under '{}'",
                category.code, parent.code
            ))),
            (false, None) => Err(ApiError::validation(format!(
                "category '{}' requires a parent unit with category in [{}]",
                category.code,
                allowed.join(", ")
            ))),
            (false, Some(parent)) => {
                if allowed.iter().any(|code| code == &parent.code) {
                    Ok(())
                } else {
                    Err(ApiError::validation(format!(
                        "category '{}' cannot sit under '{}'; allowed parents: [{}]",
                        category.code,
                        parent.code,
                        allowed.join(", ")
                    )))
                }
            }
        }
    }

    pub async fn get_unit(&self, scope: TenantScope, id: i32) -> ApiResult<Unit> {
        self.repos
            .units
            .find_by_id(scope, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Unit", id))
    }

    pub async fn create_unit(&self, scope: TenantScope, input: CreateUnit) -> ApiResult<Unit> {
        if input.capacity < 1 {
            return Err(ApiError::validation("unit capacity must be at least 1"));
        }

        let property = self
            .repos
            .properties
            .find_by_id(scope, input.property_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Property", input.property_id))?;

        let category = self
            .repos
            .catalog
            .find_category_by_id(input.category_id)
            .await?
            .filter(|c| c.is_active)
            .ok_or_else(|| ApiError::not_found("Unit category", input.category_id))?;

        let parent = match input.parent_unit_id {
            Some(parent_id) => {
                let parent = self
                    .repos
                    .units
                    .find_by_id(scope, parent_id)
                    .await?
                    .ok_or_else(|| ApiError::not_found("Unit", parent_id))?;
                if parent.property_id != property.id {
                    return Err(ApiError::validation(
                        "parent unit belongs to a different property",
                    ));
                }
                Some(parent)
            }
            None => None,
        };

        let parent_category = match &parent {
            Some(parent) => Some(
                self.repos
                    .catalog
                    .find_category_by_id(parent.category_id)
                    .await?
                    .ok_or_else(|| ApiError::not_found("Unit category", parent.category_id))?,
            ),
            None => None,
        };
        Self::validate_category_parent(&category, parent_category.as_ref())?;

        let conn = self.repos.database().get_connection();
        if let Some(parent) = &parent {
            let depth = self.unit_depth(conn, scope, parent).await? + 1;
            if depth > MAX_UNIT_DEPTH {
                return Err(ApiError::validation(format!(
                    "unit would sit at depth {depth}, exceeding the maximum of {MAX_UNIT_DEPTH}"
                )));
            }
        }

        if self
            .repos
            .units
            .code_exists(scope, property.id, &input.unit_code, None)
            .await?
        {
            return Err(ApiError::conflict("Unit", &input.unit_code));
        }

        let txn = conn.begin().await.map_err(DatabaseError::from)?;
        let unit = self
            .repos
            .units
            .create_in(
                &txn,
                scope,
                NewUnit {
                    property_id: property.id,
                    parent_unit_id: parent.as_ref().map(|p| p.id),
                    unit_code: input.unit_code,
                    display_name: input.display_name,
                    category_id: category.id,
                    floor_number: input.floor_number,
                    area_sqm: input.area_sqm,
                    capacity: input.capacity,
                    notes: input.notes,
                },
            )
            .await?;
        if let Some(parent) = &parent {
            self.refresh_leaf_flag(&txn, scope, parent.id).await?;
        }
        txn.commit().await.map_err(DatabaseError::from)?;

        info!(%scope, unit_id = unit.id, property_id = property.id, "unit created");
        Ok(unit)
    }

    pub async fn update_unit(
        &self,
        scope: TenantScope,
        id: i32,
        input: UpdateUnit,
    ) -> ApiResult<Unit> {
        let unit = self.get_unit(scope, id).await?;

        let parent_changed =
            matches!(input.parent_unit_id, Some(new) if new != unit.parent_unit_id);
        let category_changed =
            matches!(input.category_id, Some(new) if new != unit.category_id);

        if parent_changed || category_changed {
            let new_parent_id = input.parent_unit_id.unwrap_or(unit.parent_unit_id);
            if new_parent_id == Some(unit.id) {
                return Err(ApiError::validation("unit cannot be its own parent"));
            }

            let category_id = input.category_id.unwrap_or(unit.category_id);
            let category = self
                .repos
                .catalog
                .find_category_by_id(category_id)
                .await?
                .filter(|c| c.is_active)
                .ok_or_else(|| ApiError::not_found("Unit category", category_id))?;

            let conn = self.repos.database().get_connection();
            let new_parent = match new_parent_id {
                Some(parent_id) => {
                    let parent = self
                        .repos
                        .units
                        .find_by_id(scope, parent_id)
                        .await?
                        .ok_or_else(|| ApiError::not_found("Unit", parent_id))?;
                    if parent.property_id != unit.property_id {
                        return Err(ApiError::validation(
                            "parent unit belongs to a different property",
                        ));
                    }
                    // Reject moves into the unit's own subtree.
                    let mut cursor = parent.parent_unit_id;
                    let mut visited = HashSet::from([parent.id]);
                    while let Some(ancestor_id) = cursor {
                        if ancestor_id == unit.id {
                            return Err(ApiError::validation(
                                "cannot move a unit under its own descendant",
                            ));
                        }
                        if !visited.insert(ancestor_id) {
                            return Err(ApiError::validation(
                                "unit hierarchy contains a cycle",
                            ));
                        }
                        cursor = self
                            .repos
                            .units
                            .find_by_id_in(conn, scope, ancestor_id)
                            .await?
                            .ok_or_else(|| ApiError::not_found("Unit", ancestor_id))?
                            .parent_unit_id;
                    }
                    Some(parent)
                }
                None => None,
            };

            let parent_category = match &new_parent {
                Some(parent) => Some(
                    self.repos
                        .catalog
                        .find_category_by_id(parent.category_id)
                        .await?
                        .ok_or_else(|| {
                            ApiError::not_found("Unit category", parent.category_id)
                        })?,
                ),
                None => None,
            };
            Self::validate_category_parent(&category, parent_category.as_ref())?;

            let parent_depth = match &new_parent {
                Some(parent) => self.unit_depth(conn, scope, parent).await?,
                None => 0,
            };
            let height = self.subtree_height(conn, scope, unit.id).await?;
            if parent_depth + height > MAX_UNIT_DEPTH {
                return Err(ApiError::validation(format!(
                    "move would push the subtree to depth {}, exceeding the maximum of {MAX_UNIT_DEPTH}",
                    parent_depth + height
                )));
            }

            if category_changed {
                // Children keep their categories; each must still accept the
                // unit's new category as its parent.
                for child in self.repos.units.children_in(conn, scope, unit.id).await? {
                    let child_category = self
                        .repos
                        .catalog
                        .find_category_by_id(child.category_id)
                        .await?
                        .ok_or_else(|| {
                            ApiError::not_found("Unit category", child.category_id)
                        })?;
                    Self::validate_category_parent(&child_category, Some(&category))?;
                }
            }

            let txn = conn.begin().await.map_err(DatabaseError::from)?;
            if parent_changed {
                self.repos
                    .units
                    .set_parent_in(&txn, scope, unit.id, new_parent_id)
                    .await?;
                if let Some(old_parent_id) = unit.parent_unit_id {
                    self.refresh_leaf_flag(&txn, scope, old_parent_id).await?;
                }
                if let Some(new_parent_id) = new_parent_id {
                    self.refresh_leaf_flag(&txn, scope, new_parent_id).await?;
                }
            }
            if category_changed {
                self.repos
                    .units
                    .set_category_in(&txn, scope, unit.id, category.id)
                    .await?;
            }
            // The descriptive patch rides in the same transaction as the
            // structural change; one logical mutation, one commit.
            self.repos
                .units
                .update_in(&txn, scope, id, input.patch)
                .await?;
            txn.commit().await.map_err(DatabaseError::from)?;
        } else {
            self.repos.units.update(scope, id, input.patch).await?;
        }

        self.get_unit(scope, id).await
    }

    pub async fn delete_unit(&self, scope: TenantScope, id: i32) -> ApiResult<()> {
        let unit = self.get_unit(scope, id).await?;
        let conn = self.repos.database().get_connection();

        if self.repos.leases.unit_has_open_lease(scope, id).await? {
            return Err(ApiError::validation(
                "unit is covered by an open vendor lease",
            ));
        }

        let txn = conn.begin().await.map_err(DatabaseError::from)?;
        // Counted inside the delete transaction, so a child racing in
        // between check and delete cannot be orphaned.
        if self.repos.units.child_count_in(&txn, scope, id).await? > 0 {
            return Err(ApiError::validation(
                "unit has child units; remove them first",
            ));
        }
        self.repos.units.delete_in(&txn, scope, id).await?;
        if let Some(parent_id) = unit.parent_unit_id {
            self.refresh_leaf_flag(&txn, scope, parent_id).await?;
        }
        txn.commit().await.map_err(DatabaseError::from)?;

        info!(%scope, unit_id = id, "unit deleted");
        Ok(())
    }

    /// Full unit forest of a property, siblings ordered by `unit_code`.
    pub async fn build_hierarchy(
        &self,
        scope: TenantScope,
        property_id: i32,
    ) -> ApiResult<Vec<UnitTree>> {
        self.repos
            .properties
            .find_by_id(scope, property_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Property", property_id))?;

        let units = self.repos.units.units_of_property(scope, property_id).await?;
        let mut by_parent: HashMap<Option<i32>, Vec<Unit>> = HashMap::new();
        for unit in units {
            by_parent.entry(unit.parent_unit_id).or_default().push(unit);
        }

        fn assemble(
            parent: Option<i32>,
            by_parent: &mut HashMap<Option<i32>, Vec<Unit>>,
        ) -> Vec<UnitTree> {
            let mut nodes = Vec::new();
            if let Some(units) = by_parent.remove(&parent) {
                for unit in units {
                    let children = assemble(Some(unit.id), by_parent);
                    nodes.push(UnitTree { unit, children });
                }
            }
            nodes
        }

        Ok(assemble(None, &mut by_parent))
    }

    /// Breadcrumb from the property down to the unit, e.g.
    /// "Marina Tower → Floor 1 → Apt 101".
    pub async fn full_path(&self, scope: TenantScope, unit_id: i32) -> ApiResult<String> {
        let unit = self.get_unit(scope, unit_id).await?;
        let property = self
            .repos
            .properties
            .find_by_id(scope, unit.property_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Property", unit.property_id))?;

        let conn = self.repos.database().get_connection();
        let mut labels = vec![Self::label(&unit).to_string()];
        let mut visited = HashSet::from([unit.id]);
        let mut cursor = unit.parent_unit_id;
        while let Some(parent_id) = cursor {
            if !visited.insert(parent_id) {
                return Err(ApiError::validation("unit hierarchy contains a cycle"));
            }
            let parent = self
                .repos
                .units
                .find_by_id_in(conn, scope, parent_id)
                .await?
                .ok_or_else(|| ApiError::not_found("Unit", parent_id))?;
            labels.push(Self::label(&parent).to_string());
            cursor = parent.parent_unit_id;
        }
        labels.push(property.property_name);
        labels.reverse();
        Ok(labels.join(" → "))
    }

    /// Leaf units in AVAILABLE status, with rendered paths. These are the
    /// units an occupancy can be booked against.
    pub async fn leasable_units(
        &self,
        scope: TenantScope,
        property_id: Option<i32>,
        category_id: Option<i32>,
    ) -> ApiResult<Vec<LeasableUnit>> {
        let conn = self.repos.database().get_connection();
        let mut query = scoped::select::<Units>(scope)
            .filter(UnitColumn::IsLeaf.eq(true))
            .filter(UnitColumn::Status.eq(UnitStatus::Available));
        if let Some(property_id) = property_id {
            query = query.filter(UnitColumn::PropertyId.eq(property_id));
        }
        if let Some(category_id) = category_id {
            query = query.filter(UnitColumn::CategoryId.eq(category_id));
        }
        let units = query
            .order_by_asc(UnitColumn::UnitCode)
            .all(conn)
            .await
            .map_err(DatabaseError::from)?;

        let mut out = Vec::with_capacity(units.len());
        for unit in units {
            let full_path = self.full_path(scope, unit.id).await?;
            out.push(LeasableUnit { unit, full_path });
        }
        Ok(out)
    }

    fn label(unit: &Unit) -> &str {
        unit.display_name.as_deref().unwrap_or(&unit.unit_code)
    }

    /// Re-derive `is_leaf` from a live child count and persist it only when
    /// it differs from the stored value.
    async fn refresh_leaf_flag<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        unit_id: i32,
    ) -> ApiResult<()> {
        let children = self.repos.units.child_count_in(conn, scope, unit_id).await?;
        self.repos
            .units
            .set_leaf_in(conn, scope, unit_id, children == 0)
            .await?;
        Ok(())
    }

    /// Height of the subtree rooted at `root_id` (1 for a childless unit).
    async fn subtree_height<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: TenantScope,
        root_id: i32,
    ) -> ApiResult<i32> {
        let mut frontier = vec![root_id];
        let mut height = 1;
        loop {
            let mut next = Vec::new();
            for id in &frontier {
                for child in self.repos.units.children_in(conn, scope, *id).await? {
                    next.push(child.id);
                }
            }
            if next.is_empty() {
                return Ok(height);
            }
            height += 1;
            if height > MAX_UNIT_DEPTH {
                // Already taller than anything the bound allows.
                return Ok(height);
            }
            frontier = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::prelude::Json;

    fn category(code: &str, allowed: Option<Json>) -> UnitCategory {
        UnitCategory {
            id: 1,
            code: code.to_string(),
            name: code.to_string(),
            description: None,
            is_residential: true,
            is_commercial: false,
            allowed_parent_categories: allowed,
            max_depth: 3,
            is_active: true,
        }
    }

    #[test]
    fn test_root_only_category_rejects_parent() {
        let floor = category("FLOOR", None);
        let other = category("FLOOR", None);
        assert!(HierarchyService::validate_category_parent(&floor, None).is_ok());
        let err = HierarchyService::validate_category_parent(&floor, Some(&other)).unwrap_err();
        assert!(err.to_string().contains("root"));
    }

    #[test]
    fn test_child_category_requires_listed_parent() {
        let apartment = category("APARTMENT", Some(serde_json::json!(["FLOOR"])));
        let floor = category("FLOOR", None);
        let shop = category("SHOP", None);

        assert!(HierarchyService::validate_category_parent(&apartment, Some(&floor)).is_ok());

        let err =
            HierarchyService::validate_category_parent(&apartment, None).unwrap_err();
        assert!(err.to_string().contains("requires a parent"));

        let err =
            HierarchyService::validate_category_parent(&apartment, Some(&shop)).unwrap_err();
        assert!(err.to_string().contains("FLOOR"));
    }
}
