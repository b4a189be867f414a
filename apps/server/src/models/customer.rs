//! Customer-owned lists: favorite installers and logged searches

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Favorite {
    pub id: i32,
    pub customer_id: Uuid,
    pub installer_profile_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A favorite with enough of the installer to render a card.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct FavoriteInstaller {
    pub id: i32,
    pub customer_id: Uuid,
    pub installer_profile_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub installer_name: String,
    pub installer_business_name: Option<String>,
    pub installer_avatar: Option<String>,
    pub installer_verified: bool,
    pub installer_rating: f64,
    pub installer_review_count: i64,
    pub primary_service: Option<String>,
    pub service_area_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFavorite {
    pub installer_profile_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct SearchHistoryEntry {
    pub id: i32,
    pub customer_id: Uuid,
    pub search_query: Option<String>,
    pub service_category_id: Option<i32>,
    pub city_id: Option<i32>,
    pub region_id: Option<i32>,
    pub results_count: i32,
    pub created_at: DateTime<Utc>,
    pub service_name: Option<String>,
    pub city_name: Option<String>,
    pub region_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewSearchHistory {
    #[validate(length(max = 255, message = "search_query must be at most 255 characters"))]
    pub search_query: Option<String>,
    #[validate(range(min = 1, message = "service_category_id must be positive"))]
    pub service_category_id: Option<i32>,
    #[validate(range(min = 1, message = "city_id must be positive"))]
    pub city_id: Option<i32>,
    #[validate(range(min = 1, message = "region_id must be positive"))]
    pub region_id: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 0, max = 10000, message = "results_count must be between 0 and 10000"))]
    pub results_count: i32,
}

impl NewSearchHistory {
    /// Trimmed query text, `None` when blank.
    pub fn query_text(&self) -> Option<&str> {
        self.search_query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    /// A logged search needs some text or at least one filter.
    pub fn has_criteria(&self) -> bool {
        self.query_text().is_some()
            || self.service_category_id.is_some()
            || self.city_id.is_some()
            || self.region_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_without_filters_has_no_criteria() {
        let entry: NewSearchHistory =
            serde_json::from_str(r#"{"search_query": "   "}"#).unwrap();
        assert!(!entry.has_criteria());
        assert_eq!(entry.results_count, 0);

        let entry: NewSearchHistory = serde_json::from_str(r#"{"city_id": 4}"#).unwrap();
        assert!(entry.has_criteria());
    }

    #[test]
    fn out_of_range_values_fail_validation() {
        let entry = NewSearchHistory {
            search_query: Some("instalator".to_string()),
            region_id: Some(0),
            results_count: 10_001,
            ..NewSearchHistory::default()
        };
        let errors = entry.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("region_id"));
        assert!(fields.contains_key("results_count"));
    }
}
