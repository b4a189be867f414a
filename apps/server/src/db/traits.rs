//! Storage seams used by the marketplace services
//!
//! The services only talk to storage through these traits, so they can be
//! exercised against in-memory doubles in unit tests while production wires
//! in [`crate::db::PostgresMarketplaceStore`].

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::search::{PageRequest, PagedQuery},
    models::{
        InstallerDetailRow, InstallerRow, InstallerService, ProfileFields, ProfileRecord,
        ServiceArea,
    },
    Result,
};

/// Read access for installer listings and profile pages.
#[async_trait]
pub trait InstallerStore: Send + Sync {
    /// Number of rows matching the query's filters.
    async fn count_installers(&self, query: &PagedQuery) -> Result<i64>;

    /// One page of rows matching the query's filters, in the query's order.
    async fn fetch_installers(
        &self,
        query: &PagedQuery,
        page: &PageRequest,
    ) -> Result<Vec<InstallerRow>>;

    /// Offerings of one installer, primary first then by Romanian name.
    async fn services_for(&self, installer_id: Uuid) -> Result<Vec<InstallerService>>;

    /// Cities one installer works in, by name.
    async fn service_areas_for(&self, installer_id: Uuid) -> Result<Vec<ServiceArea>>;

    async fn installer_detail(&self, installer_id: Uuid) -> Result<Option<InstallerDetailRow>>;
}

/// Write access for installer profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    type Tx: ProfileTransaction;

    async fn find_profile(&self, installer_id: Uuid) -> Result<Option<ProfileRecord>>;

    /// Ids from `ids` that do not name an existing service category.
    async fn unknown_category_ids(&self, ids: &[i32]) -> Result<Vec<i32>>;

    /// Ids from `ids` that do not name an existing city.
    async fn unknown_city_ids(&self, ids: &[i32]) -> Result<Vec<i32>>;

    async fn begin(&self) -> Result<Self::Tx>;
}

/// Profile mutations scoped to one database transaction.
///
/// Nothing is visible to other sessions until [`ProfileTransaction::commit`].
/// Dropping the value without committing discards every change.
#[async_trait]
pub trait ProfileTransaction: Send {
    /// Read the profile and hold a row lock until the transaction ends.
    async fn lock_profile(&mut self, installer_id: Uuid) -> Result<Option<ProfileRecord>>;

    /// Write the scalar set and mark the profile completed.
    async fn update_profile_fields(
        &mut self,
        installer_id: Uuid,
        fields: &ProfileFields,
    ) -> Result<()>;

    /// Delete all offerings, then insert one per id. The row whose id equals
    /// `primary_id` is flagged primary.
    async fn replace_services(
        &mut self,
        installer_id: Uuid,
        category_ids: &[i32],
        primary_id: Option<i32>,
    ) -> Result<()>;

    /// Delete all service areas, then insert one per city id.
    async fn replace_service_areas(&mut self, installer_id: Uuid, city_ids: &[i32]) -> Result<()>;

    /// Increment the profile version and touch `updated_at`; returns the new version.
    async fn bump_version(&mut self, installer_id: Uuid) -> Result<i32>;

    async fn commit(self) -> Result<()>;

    async fn rollback(self) -> Result<()>;
}
