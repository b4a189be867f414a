//! Customer reviews and their aggregates

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Review {
    pub id: Uuid,
    pub installer_profile_id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    #[serde(rename = "customer_avatar")]
    pub customer_avatar_url: Option<String>,
    pub service_category_id: i32,
    pub service_name: String,
    pub rating: i32,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub work_completed_at: Option<DateTime<Utc>>,
    pub is_verified: bool,
    pub helpful_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A review as its author sees it in their own history.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct CustomerReview {
    pub id: Uuid,
    pub installer_profile_id: Uuid,
    pub service_category_id: i32,
    pub rating: i32,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub work_completed_at: Option<DateTime<Utc>>,
    pub is_verified: bool,
    pub helpful_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub installer_business_name: Option<String>,
    pub installer_name: String,
    pub installer_avatar: Option<String>,
    pub installer_verified: bool,
    pub service_name: Option<String>,
    pub installer_display_name: String,
}

/// Author and target of a review, used for ownership checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct ReviewOwner {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub installer_profile_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewReview {
    pub installer_profile_id: Uuid,
    #[validate(range(min = 1, message = "service_category_id is required"))]
    pub service_category_id: i32,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,
    #[validate(length(min = 3, max = 100, message = "title must be between 3 and 100 characters"))]
    pub title: String,
    #[validate(length(
        min = 10,
        max = 2000,
        message = "comment must be between 10 and 2000 characters"
    ))]
    pub comment: String,
    pub work_completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ReviewPatch {
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: Option<i32>,
    #[validate(length(min = 3, max = 100, message = "title must be between 3 and 100 characters"))]
    pub title: Option<String>,
    #[validate(length(
        min = 10,
        max = 2000,
        message = "comment must be between 10 and 2000 characters"
    ))]
    pub comment: Option<String>,
}

impl ReviewPatch {
    pub fn is_empty(&self) -> bool {
        self.rating.is_none() && self.title.is_none() && self.comment.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct CreatedReview {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct UpdatedReview {
    pub id: Uuid,
    pub updated_at: DateTime<Utc>,
}

/// Rating aggregates for one installer, derived from live review rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingStats {
    pub average_rating: f64,
    pub total_reviews: i64,
    /// Always carries the keys 1 through 5.
    pub distribution: BTreeMap<u8, i64>,
}

impl RatingStats {
    /// Build stats from `(rating, count)` pairs; ratings outside 1..=5 are ignored.
    pub fn from_histogram<I>(histogram: I) -> Self
    where
        I: IntoIterator<Item = (i32, i64)>,
    {
        let mut distribution: BTreeMap<u8, i64> = (1..=5).map(|r| (r, 0)).collect();
        for (rating, count) in histogram {
            if let Ok(key) = u8::try_from(rating) {
                if let Some(slot) = distribution.get_mut(&key) {
                    *slot += count.max(0);
                }
            }
        }

        let total_reviews: i64 = distribution.values().sum();
        let weighted: i64 = distribution
            .iter()
            .map(|(rating, count)| i64::from(*rating) * count)
            .sum();
        let average_rating = if total_reviews == 0 {
            0.0
        } else {
            weighted as f64 / total_reviews as f64
        };

        Self {
            average_rating,
            total_reviews,
            distribution,
        }
    }

    pub fn empty() -> Self {
        Self::from_histogram(std::iter::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_reviews_give_zero_average_and_full_distribution() {
        let stats = RatingStats::empty();
        assert_eq!(stats.average_rating, 0.0);
        assert_eq!(stats.total_reviews, 0);
        assert_eq!(stats.distribution.len(), 5);
        assert!(stats.distribution.values().all(|c| *c == 0));
    }

    #[test]
    fn average_is_weighted_by_counts() {
        let stats = RatingStats::from_histogram([(5, 3), (4, 1)]);
        assert_eq!(stats.total_reviews, 4);
        assert!((stats.average_rating - 4.75).abs() < 1e-9);
        assert_eq!(stats.distribution[&5], 3);
        assert_eq!(stats.distribution[&4], 1);
        assert_eq!(stats.distribution[&1], 0);
    }

    #[test]
    fn out_of_range_ratings_are_ignored() {
        let stats = RatingStats::from_histogram([(0, 2), (6, 1), (3, 2)]);
        assert_eq!(stats.total_reviews, 2);
        assert_eq!(stats.average_rating, 3.0);
    }

    #[test]
    fn distribution_serializes_with_string_keys() {
        let stats = RatingStats::from_histogram([(2, 1)]);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["distribution"]["2"], 1);
        assert_eq!(json["distribution"]["5"], 0);
    }

    #[test]
    fn review_validation_bounds() {
        let review = NewReview {
            installer_profile_id: Uuid::new_v4(),
            service_category_id: 1,
            rating: 6,
            title: "ok".into(),
            comment: "too short".into(),
            work_completed_at: None,
        };
        let errors = review.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("rating"));
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("comment"));
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(ReviewPatch::default().is_empty());
        let patch = ReviewPatch {
            rating: Some(4),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        assert!(patch.validate().is_ok());
    }
}
