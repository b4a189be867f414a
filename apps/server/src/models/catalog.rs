//! Static reference data: service categories, regions and cities

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ServiceCategory {
    pub id: i32,
    pub name_ro: String,
    pub name_en: Option<String>,
    pub slug: String,
    pub icon: Option<String>,
    pub parent_id: Option<i32>,
    pub is_active: bool,
    pub display_order: i32,
}

/// A top-level category with its direct subcategories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: ServiceCategory,
    pub subcategories: Vec<ServiceCategory>,
}

impl CategoryNode {
    /// Group an already ordered flat list into a two-level tree.
    ///
    /// Subcategories whose parent is missing from the list are dropped.
    pub fn build_tree(categories: Vec<ServiceCategory>) -> Vec<CategoryNode> {
        let (roots, children): (Vec<_>, Vec<_>) =
            categories.into_iter().partition(|c| c.parent_id.is_none());

        roots
            .into_iter()
            .map(|category| {
                let subcategories = children
                    .iter()
                    .filter(|c| c.parent_id == Some(category.id))
                    .cloned()
                    .collect();
                CategoryNode {
                    category,
                    subcategories,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Region {
    pub id: i32,
    pub name: String,
    pub code: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct City {
    pub id: i32,
    pub name: String,
    pub region_id: i32,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub population: Option<i32>,
    pub region_name: String,
    pub region_code: String,
}
