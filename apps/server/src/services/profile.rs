//! Installer profile service
//!
//! Reads installer profile pages and applies owner updates. An update
//! replaces scalar attributes, service offerings and service areas inside
//! one transaction: either every requested change is visible afterwards or
//! none is.

use std::collections::HashSet;
use std::sync::Arc;

use futures::try_join;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{InstallerStore, ProfileStore, ProfileTransaction},
    error::FieldIssue,
    metrics::PROFILE_UPDATES_TOTAL,
    models::{InstallerDetail, ProfileFields, ProfilePatch, ProfileRecord},
    Error, Result,
};

/// Outcome of a successful update: the re-read profile and its new version.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub installer: InstallerDetail,
    pub version: i32,
}

/// Validated form of a patch, ready to apply.
#[derive(Debug, Clone, PartialEq)]
struct UpdatePlan {
    /// Scalar part of the patch, validated against the pre-transaction row.
    scalars: Option<ProfilePatch>,
    service_category_ids: Option<Vec<i32>>,
    primary_service_id: Option<i32>,
    city_ids: Option<Vec<i32>>,
}

pub struct ProfileService<S> {
    store: Arc<S>,
}

impl<S> Clone for ProfileService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

fn check_id_list(field: &str, ids: &[i32], issues: &mut Vec<FieldIssue>) {
    if ids.iter().any(|id| *id <= 0) {
        issues.push(FieldIssue::new(field, format!("{field} must contain positive ids")));
    }
    let mut seen = HashSet::with_capacity(ids.len());
    let duplicates: Vec<String> = ids
        .iter()
        .filter(|id| !seen.insert(**id))
        .map(|id| id.to_string())
        .collect();
    if !duplicates.is_empty() {
        issues.push(FieldIssue::new(
            field,
            format!("{field} contains duplicate ids: {}", duplicates.join(", ")),
        ));
    }
}

fn join_ids(ids: &[i32]) -> String {
    ids.iter().map(i32::to_string).collect::<Vec<_>>().join(", ")
}

fn record_outcome(outcome: &str) {
    PROFILE_UPDATES_TOTAL.with_label_values(&[outcome]).inc();
}

impl<S> ProfileService<S>
where
    S: ProfileStore + InstallerStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Profile page: installer row, offerings and service areas.
    pub async fn get(&self, installer_id: Uuid) -> Result<InstallerDetail> {
        let (installer, services, service_areas) = try_join!(
            self.store.installer_detail(installer_id),
            self.store.services_for(installer_id),
            self.store.service_areas_for(installer_id)
        )?;

        let installer = installer.ok_or_else(|| Error::not_found("Installer"))?;
        Ok(InstallerDetail {
            installer,
            services,
            service_areas,
        })
    }

    /// Apply `patch` to the installer owned by `caller_id`.
    ///
    /// `expected_version` comes from `If-Match`; a mismatch fails with
    /// `VersionConflict` and changes nothing.
    #[tracing::instrument(skip(self, patch), fields(installer_id = %installer_id, caller_id = %caller_id))]
    pub async fn update(
        &self,
        installer_id: Uuid,
        caller_id: Uuid,
        patch: ProfilePatch,
        expected_version: Option<i32>,
    ) -> Result<ProfileUpdate> {
        let result = self
            .run_update(installer_id, caller_id, patch, expected_version)
            .await;

        match &result {
            Ok(update) => {
                record_outcome("ok");
                tracing::info!(version = update.version, "Installer profile updated");
            }
            Err(Error::Forbidden(_)) => record_outcome("forbidden"),
            Err(Error::NotFound(_)) => record_outcome("not_found"),
            Err(Error::VersionConflict { .. }) => record_outcome("conflict"),
            Err(Error::InvalidFields(_)) | Err(Error::Validation(_)) => record_outcome("invalid"),
            Err(e) => {
                record_outcome("failed");
                tracing::error!(error = %e, "Installer profile update failed");
            }
        }

        result
    }

    async fn run_update(
        &self,
        installer_id: Uuid,
        caller_id: Uuid,
        patch: ProfilePatch,
        expected_version: Option<i32>,
    ) -> Result<ProfileUpdate> {
        let current = self
            .store
            .find_profile(installer_id)
            .await?
            .ok_or_else(|| Error::not_found("Installer profile"))?;

        if current.user_id != caller_id {
            return Err(Error::Forbidden(
                "You can only update your own profile".to_string(),
            ));
        }

        if let Some(expected) = expected_version {
            if expected != current.version {
                return Err(Error::VersionConflict {
                    expected,
                    actual: current.version,
                });
            }
        }

        if patch.is_empty() {
            let installer = self.get(installer_id).await?;
            return Ok(ProfileUpdate {
                installer,
                version: current.version,
            });
        }

        let plan = self.plan(&current, patch).await?;

        let mut tx = self
            .store
            .begin()
            .await
            .map_err(|e| Error::UpdateFailed(e.to_string()))?;

        let version = match Self::apply(&mut tx, installer_id, &plan, expected_version).await {
            Ok(version) => version,
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "Rollback failed");
                }
                return Err(match e {
                    Error::VersionConflict { .. } | Error::NotFound(_) => e,
                    other => Error::UpdateFailed(other.to_string()),
                });
            }
        };

        tx.commit()
            .await
            .map_err(|e| Error::UpdateFailed(e.to_string()))?;

        let installer = self.get(installer_id).await?;
        Ok(ProfileUpdate { installer, version })
    }

    /// Validate everything before any write happens.
    async fn plan(&self, current: &ProfileRecord, patch: ProfilePatch) -> Result<UpdatePlan> {
        let mut issues = Vec::new();

        let scalars = if patch.has_scalars() {
            let fields = ProfileFields::merge(current, &patch);
            if let Err(errors) = fields.validate() {
                if let Error::InvalidFields(mut found) = Error::from(errors) {
                    issues.append(&mut found);
                }
            }
            Some(ProfilePatch {
                business_name: patch.business_name.clone(),
                bio: patch.bio.clone(),
                years_experience: patch.years_experience,
                is_available: patch.is_available,
                ..Default::default()
            })
        } else {
            None
        };

        if let Some(ids) = &patch.service_category_ids {
            check_id_list("service_category_ids", ids, &mut issues);
        }
        if let Some(ids) = &patch.city_ids {
            check_id_list("city_ids", ids, &mut issues);
        }
        if matches!(patch.primary_service_id, Some(id) if id <= 0) {
            issues.push(FieldIssue::new(
                "primary_service_id",
                "primary_service_id must be a positive id",
            ));
        }

        if !issues.is_empty() {
            return Err(Error::InvalidFields(issues));
        }

        if let Some(ids) = &patch.service_category_ids {
            let unknown = self.store.unknown_category_ids(ids).await?;
            if !unknown.is_empty() {
                issues.push(FieldIssue::new(
                    "service_category_ids",
                    format!("Unknown service categories: {}", join_ids(&unknown)),
                ));
            }
        }
        if let Some(ids) = &patch.city_ids {
            let unknown = self.store.unknown_city_ids(ids).await?;
            if !unknown.is_empty() {
                issues.push(FieldIssue::new(
                    "city_ids",
                    format!("Unknown cities: {}", join_ids(&unknown)),
                ));
            }
        }

        if !issues.is_empty() {
            return Err(Error::InvalidFields(issues));
        }

        Ok(UpdatePlan {
            scalars,
            service_category_ids: patch.service_category_ids,
            primary_service_id: patch.primary_service_id,
            city_ids: patch.city_ids,
        })
    }

    async fn apply(
        tx: &mut S::Tx,
        installer_id: Uuid,
        plan: &UpdatePlan,
        expected_version: Option<i32>,
    ) -> Result<i32> {
        let locked = tx
            .lock_profile(installer_id)
            .await?
            .ok_or_else(|| Error::not_found("Installer profile"))?;

        if let Some(expected) = expected_version {
            if expected != locked.version {
                return Err(Error::VersionConflict {
                    expected,
                    actual: locked.version,
                });
            }
        }

        if let Some(scalars) = &plan.scalars {
            // Overlay on the locked row so values written by a concurrent
            // update for fields absent from this patch are kept.
            let fields = ProfileFields::merge(&locked, scalars);
            tx.update_profile_fields(installer_id, &fields).await?;
        }

        if let Some(ids) = &plan.service_category_ids {
            let primary = plan.primary_service_id.filter(|p| ids.contains(p));
            tx.replace_services(installer_id, ids, primary).await?;
        }

        if let Some(ids) = &plan.city_ids {
            tx.replace_service_areas(installer_id, ids).await?;
        }

        tx.bump_version(installer_id).await
    }
}
