//! Catalog repository - service categories and locations

use sqlx::PgPool;

use crate::{
    models::{City, Region, ServiceCategory},
    Error, Result,
};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active categories ordered for display.
    pub async fn active_categories(&self) -> Result<Vec<ServiceCategory>> {
        sqlx::query_as::<_, ServiceCategory>(
            "SELECT id, name_ro, name_en, slug, icon, parent_id, is_active, display_order
             FROM service_categories
             WHERE is_active = true
             ORDER BY display_order ASC, name_ro ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)
    }

    pub async fn regions(&self) -> Result<Vec<Region>> {
        sqlx::query_as::<_, Region>("SELECT id, name, code, type FROM regions ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)
    }

    /// Cities, largest first, optionally restricted to one region.
    pub async fn cities(&self, region_id: Option<i32>) -> Result<Vec<City>> {
        sqlx::query_as::<_, City>(
            "SELECT c.id, c.name, c.region_id, c.postal_code, c.latitude, c.longitude,
                    c.population, r.name AS region_name, r.code AS region_code
             FROM cities c
             JOIN regions r ON r.id = c.region_id
             WHERE $1::int4 IS NULL OR c.region_id = $1
             ORDER BY c.population DESC NULLS LAST, c.name ASC",
        )
        .bind(region_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)
    }
}
