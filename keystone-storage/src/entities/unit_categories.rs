//! Unit category lookup table (global, not tenant-scoped)
//!
//! Categories such as FLOOR, APARTMENT, BEDSPACE, SHOP, OFFICE. The
//! `allowed_parent_categories` allow-list drives hierarchy validation: an
//! empty or absent list means the category may only appear at the root.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "unit_categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub is_residential: bool,
    pub is_commercial: bool,
    /// JSON array of parent category codes that may sit above this one.
    pub allowed_parent_categories: Option<Json>,
    pub max_depth: i32,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Parent category codes allowed above this category. Empty means the
    /// category is root-only.
    pub fn allowed_parents(&self) -> Vec<String> {
        match &self.allowed_parent_categories {
            Some(Json::Array(values)) => values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(allowed: Option<Json>) -> Model {
        Model {
            id: 1,
            code: "APARTMENT".into(),
            name: "Apartment".into(),
            description: None,
            is_residential: true,
            is_commercial: false,
            allowed_parent_categories: allowed,
            max_depth: 3,
            is_active: true,
        }
    }

    #[test]
    fn test_allowed_parents_absent_means_root_only() {
        assert!(category(None).allowed_parents().is_empty());
        assert!(category(Some(serde_json::json!([])))
            .allowed_parents()
            .is_empty());
    }

    #[test]
    fn test_allowed_parents_parses_codes() {
        let model = category(Some(serde_json::json!(["FLOOR", "BUILDING"])));
        assert_eq!(model.allowed_parents(), vec!["FLOOR", "BUILDING"]);
    }
}
