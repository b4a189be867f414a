//! Customer repository - favorites and search history

use sqlx::PgPool;
use uuid::Uuid;

use super::search::{favorites_query, search_history_query, PageRequest, SEARCH_HISTORY_SELECT};
use super::{fetch_page, violated_foreign_key};
use crate::{
    models::{Favorite, FavoriteInstaller, NewSearchHistory, SearchHistoryEntry},
    Error, Result,
};

/// Turn a foreign key failure into the caller-facing error for the
/// reference that was missing.
fn missing_reference(err: sqlx::Error) -> Error {
    let constraint = violated_foreign_key(&err).map(str::to_owned);
    match constraint.as_deref() {
        Some(c) if c.ends_with("customer_id_fkey") => Error::not_found("Customer"),
        Some(c) if c.ends_with("installer_profile_id_fkey") => Error::not_found("Installer"),
        Some(c) if c.ends_with("service_category_id_fkey") => {
            Error::field("service_category_id", "Service category does not exist")
        }
        Some(c) if c.ends_with("city_id_fkey") => Error::field("city_id", "City does not exist"),
        Some(c) if c.ends_with("region_id_fkey") => {
            Error::field("region_id", "Region does not exist")
        }
        _ => Error::Database(err),
    }
}

#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_favorites(
        &self,
        customer_id: Uuid,
        page: &PageRequest,
    ) -> Result<(Vec<FavoriteInstaller>, i64)> {
        fetch_page(&self.pool, &favorites_query(customer_id), page).await
    }

    /// Insert a favorite; `None` when the pair already existed.
    pub async fn insert_favorite(
        &self,
        customer_id: Uuid,
        installer_id: Uuid,
    ) -> Result<Option<Favorite>> {
        sqlx::query_as::<_, Favorite>(
            "INSERT INTO customer_favorites (customer_id, installer_profile_id)
             VALUES ($1, $2)
             ON CONFLICT (customer_id, installer_profile_id) DO NOTHING
             RETURNING id, customer_id, installer_profile_id, created_at",
        )
        .bind(customer_id)
        .bind(installer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(missing_reference)
    }

    pub async fn find_favorite(
        &self,
        customer_id: Uuid,
        installer_id: Uuid,
    ) -> Result<Option<Favorite>> {
        sqlx::query_as::<_, Favorite>(
            "SELECT id, customer_id, installer_profile_id, created_at
             FROM customer_favorites
             WHERE customer_id = $1 AND installer_profile_id = $2",
        )
        .bind(customer_id)
        .bind(installer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)
    }

    /// Delete a favorite owned by `customer_id`; false when there was none.
    pub async fn delete_favorite(&self, customer_id: Uuid, favorite_id: i32) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM customer_favorites WHERE id = $1 AND customer_id = $2")
                .bind(favorite_id)
                .bind(customer_id)
                .execute(&self.pool)
                .await
                .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_search_history(
        &self,
        customer_id: Uuid,
        page: &PageRequest,
    ) -> Result<(Vec<SearchHistoryEntry>, i64)> {
        fetch_page(&self.pool, &search_history_query(customer_id), page).await
    }

    pub async fn insert_search(
        &self,
        customer_id: Uuid,
        entry: &NewSearchHistory,
    ) -> Result<SearchHistoryEntry> {
        let sql = format!(
            "WITH sh AS (
                INSERT INTO customer_search_history (
                    customer_id, search_query, service_category_id, city_id, region_id,
                    results_count
                )
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
             )
             SELECT {SEARCH_HISTORY_SELECT}
             FROM sh
             LEFT JOIN service_categories sc ON sc.id = sh.service_category_id
             LEFT JOIN cities c ON c.id = sh.city_id
             LEFT JOIN regions rg ON rg.id = sh.region_id"
        );

        sqlx::query_as::<_, SearchHistoryEntry>(&sql)
            .bind(customer_id)
            .bind(entry.query_text())
            .bind(entry.service_category_id)
            .bind(entry.city_id)
            .bind(entry.region_id)
            .bind(entry.results_count)
            .fetch_one(&self.pool)
            .await
            .map_err(missing_reference)
    }
}
