//! Installer profiles, their service offerings and service areas

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One installer row of a search page, with live rating aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct InstallerRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_name: Option<String>,
    pub bio: Option<String>,
    pub years_experience: Option<i32>,
    pub is_verified: bool,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub owner_name: String,
    pub owner_avatar_url: Option<String>,
    pub average_rating: f64,
    pub review_count: i64,
}

/// A service category offered by an installer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct InstallerService {
    pub id: i32,
    pub name_ro: String,
    pub name_en: Option<String>,
    pub slug: String,
    pub icon: Option<String>,
    pub is_primary: bool,
}

/// A city an installer works in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ServiceArea {
    pub id: i32,
    pub name: String,
    pub region_id: i32,
    pub region_name: String,
    pub region_code: String,
}

/// Search result entry: the installer row plus its offerings and cities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstallerSummary {
    #[serde(flatten)]
    pub installer: InstallerRow,
    pub services: Vec<InstallerService>,
    pub cities: Vec<ServiceArea>,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct InstallerDetailRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_name: Option<String>,
    pub bio: Option<String>,
    pub years_experience: Option<i32>,
    pub is_verified: bool,
    pub is_available: bool,
    pub profile_completed: bool,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner_name: String,
    pub owner_avatar_url: Option<String>,
    pub owner_phone: Option<String>,
    pub average_rating: f64,
    pub review_count: i64,
}

/// Full installer profile as shown on the profile page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstallerDetail {
    #[serde(flatten)]
    pub installer: InstallerDetailRow,
    pub services: Vec<InstallerService>,
    pub service_areas: Vec<ServiceArea>,
}

/// The mutable part of a stored profile plus ownership and version.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ProfileRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_name: Option<String>,
    pub bio: Option<String>,
    pub years_experience: Option<i32>,
    pub is_available: bool,
    pub profile_completed: bool,
    pub version: i32,
}

/// Body of a profile update.
///
/// Absent scalars keep their stored value; an empty string clears a text
/// field. Absent id lists leave offerings/areas untouched, `[]` clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProfilePatch {
    pub business_name: Option<String>,
    pub bio: Option<String>,
    pub years_experience: Option<i32>,
    pub is_available: Option<bool>,
    pub service_category_ids: Option<Vec<i32>>,
    pub primary_service_id: Option<i32>,
    pub city_ids: Option<Vec<i32>>,
}

impl ProfilePatch {
    pub fn has_scalars(&self) -> bool {
        self.business_name.is_some()
            || self.bio.is_some()
            || self.years_experience.is_some()
            || self.is_available.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_scalars() && self.service_category_ids.is_none() && self.city_ids.is_none()
    }
}

/// The complete scalar set written by an update, validated as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct ProfileFields {
    #[validate(length(
        min = 2,
        max = 255,
        message = "business_name must be between 2 and 255 characters"
    ))]
    pub business_name: Option<String>,
    #[validate(length(max = 1000, message = "bio must be at most 1000 characters"))]
    pub bio: Option<String>,
    #[validate(range(min = 0, max = 70, message = "years_experience must be between 0 and 70"))]
    pub years_experience: Option<i32>,
    pub is_available: bool,
}

fn blank_to_none(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl ProfileFields {
    /// Overlay the patch's scalars onto the stored profile.
    pub fn merge(current: &ProfileRecord, patch: &ProfilePatch) -> Self {
        Self {
            business_name: match &patch.business_name {
                Some(v) => blank_to_none(v.clone()),
                None => current.business_name.clone(),
            },
            bio: match &patch.bio {
                Some(v) => blank_to_none(v.clone()),
                None => current.bio.clone(),
            },
            years_experience: patch.years_experience.or(current.years_experience),
            is_available: patch.is_available.unwrap_or(current.is_available),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ProfileRecord {
        ProfileRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            business_name: Some("Instal Pro".into()),
            bio: Some("Old bio".into()),
            years_experience: Some(5),
            is_available: true,
            profile_completed: false,
            version: 1,
        }
    }

    #[test]
    fn merge_keeps_absent_scalars() {
        let patch = ProfilePatch {
            bio: Some("New bio".into()),
            ..Default::default()
        };
        let fields = ProfileFields::merge(&record(), &patch);
        assert_eq!(fields.business_name.as_deref(), Some("Instal Pro"));
        assert_eq!(fields.bio.as_deref(), Some("New bio"));
        assert_eq!(fields.years_experience, Some(5));
        assert!(fields.is_available);
    }

    #[test]
    fn empty_string_clears_text_fields() {
        let patch = ProfilePatch {
            bio: Some("   ".into()),
            ..Default::default()
        };
        let fields = ProfileFields::merge(&record(), &patch);
        assert_eq!(fields.bio, None);
        assert!(fields.validate().is_ok());
    }

    #[test]
    fn validation_bounds() {
        let mut fields = ProfileFields::merge(&record(), &ProfilePatch::default());
        assert!(fields.validate().is_ok());

        fields.business_name = Some("A".into());
        assert!(fields.validate().is_err());

        fields.business_name = None;
        fields.years_experience = Some(71);
        assert!(fields.validate().is_err());

        fields.years_experience = Some(0);
        fields.bio = Some("x".repeat(1001));
        assert!(fields.validate().is_err());
    }

    #[test]
    fn patch_distinguishes_missing_from_empty_lists() {
        let patch: ProfilePatch = serde_json::from_str(r#"{"city_ids": []}"#).unwrap();
        assert_eq!(patch.city_ids, Some(vec![]));
        assert_eq!(patch.service_category_ids, None);
        assert!(!patch.has_scalars());
        assert!(!patch.is_empty());

        let patch: ProfilePatch = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn summary_flattens_installer_fields() {
        let summary = InstallerSummary {
            installer: InstallerRow {
                id: Uuid::nil(),
                user_id: Uuid::nil(),
                business_name: Some("Termo".into()),
                bio: None,
                years_experience: None,
                is_verified: true,
                is_available: true,
                created_at: Utc::now(),
                owner_name: "Ion".into(),
                owner_avatar_url: None,
                average_rating: 4.5,
                review_count: 2,
            },
            services: vec![],
            cities: vec![],
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["business_name"], "Termo");
        assert_eq!(json["average_rating"], 4.5);
        assert!(json["services"].is_array());
    }
}
