//! PostgreSQL implementation of the installer and profile stores

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::search::query_builder::{bind_query_as, bind_scalar};
use super::search::{PageRequest, PagedQuery};
use super::traits::{InstallerStore, ProfileStore};
use super::transaction::PostgresProfileTransaction;
use crate::{
    models::{InstallerDetailRow, InstallerRow, InstallerService, ProfileRecord, ServiceArea},
    Error, Result,
};

#[derive(Clone)]
pub struct PostgresMarketplaceStore {
    pool: PgPool,
}

impl PostgresMarketplaceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn missing_ids(&self, table: &'static str, ids: &[i32]) -> Result<Vec<i32>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT t.id
             FROM UNNEST($1::int4[]) AS t(id)
             WHERE NOT EXISTS (SELECT 1 FROM {table} x WHERE x.id = t.id)
             ORDER BY t.id"
        );

        sqlx::query_scalar::<_, i32>(&sql)
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)
    }
}

#[async_trait]
impl InstallerStore for PostgresMarketplaceStore {
    async fn count_installers(&self, query: &PagedQuery) -> Result<i64> {
        let (sql, binds) = query.build_count_sql();
        tracing::debug!(sql = %sql, bind_count = binds.len(), "Counting installers");

        bind_scalar(sqlx::query_scalar::<_, i64>(&sql), binds)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn fetch_installers(
        &self,
        query: &PagedQuery,
        page: &PageRequest,
    ) -> Result<Vec<InstallerRow>> {
        let (sql, binds) = query.build_page_sql(page);
        tracing::debug!(sql = %sql, bind_count = binds.len(), "Fetching installer page");

        bind_query_as(sqlx::query_as::<_, InstallerRow>(&sql), binds)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn services_for(&self, installer_id: Uuid) -> Result<Vec<InstallerService>> {
        sqlx::query_as::<_, InstallerService>(
            "SELECT sc.id, sc.name_ro, sc.name_en, sc.slug, sc.icon, ins.is_primary
             FROM installer_services ins
             JOIN service_categories sc ON sc.id = ins.service_category_id
             WHERE ins.installer_profile_id = $1
             ORDER BY ins.is_primary DESC, sc.name_ro ASC",
        )
        .bind(installer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn service_areas_for(&self, installer_id: Uuid) -> Result<Vec<ServiceArea>> {
        sqlx::query_as::<_, ServiceArea>(
            "SELECT c.id, c.name, c.region_id, r.name AS region_name, r.code AS region_code
             FROM installer_service_areas isa
             JOIN cities c ON c.id = isa.city_id
             JOIN regions r ON r.id = c.region_id
             WHERE isa.installer_profile_id = $1
             ORDER BY c.name ASC",
        )
        .bind(installer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn installer_detail(&self, installer_id: Uuid) -> Result<Option<InstallerDetailRow>> {
        sqlx::query_as::<_, InstallerDetailRow>(
            "SELECT ip.id, ip.user_id, ip.business_name, ip.bio, ip.years_experience,
                    ip.is_verified, ip.is_available, ip.profile_completed, ip.version,
                    ip.created_at, ip.updated_at,
                    u.name AS owner_name, u.avatar_url AS owner_avatar_url, u.phone AS owner_phone,
                    (SELECT COALESCE(AVG(r.rating), 0) FROM reviews r
                      WHERE r.installer_profile_id = ip.id)::float8 AS average_rating,
                    (SELECT COUNT(*) FROM reviews r
                      WHERE r.installer_profile_id = ip.id) AS review_count
             FROM installer_profiles ip
             JOIN users u ON u.id = ip.user_id
             WHERE ip.id = $1",
        )
        .bind(installer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)
    }
}

#[async_trait]
impl ProfileStore for PostgresMarketplaceStore {
    type Tx = PostgresProfileTransaction;

    async fn find_profile(&self, installer_id: Uuid) -> Result<Option<ProfileRecord>> {
        sqlx::query_as::<_, ProfileRecord>(
            "SELECT id, user_id, business_name, bio, years_experience, is_available,
                    profile_completed, version
             FROM installer_profiles
             WHERE id = $1",
        )
        .bind(installer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn unknown_category_ids(&self, ids: &[i32]) -> Result<Vec<i32>> {
        self.missing_ids("service_categories", ids).await
    }

    async fn unknown_city_ids(&self, ids: &[i32]) -> Result<Vec<i32>> {
        self.missing_ids("cities", ids).await
    }

    async fn begin(&self) -> Result<Self::Tx> {
        let tx = self.pool.begin().await.map_err(Error::Database)?;
        Ok(PostgresProfileTransaction::new(tx))
    }
}
