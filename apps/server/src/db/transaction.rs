//! PostgreSQL transaction support for atomic profile updates

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::traits::ProfileTransaction;
use crate::{
    models::{ProfileFields, ProfileRecord},
    Error, Result,
};

/// PostgreSQL transaction context
pub struct PostgresProfileTransaction {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PostgresProfileTransaction {
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self { tx: Some(tx) }
    }

    pub(crate) fn tx_mut(&mut self) -> Result<&mut Transaction<'static, Postgres>> {
        self.tx.as_mut().ok_or_else(|| {
            Error::Internal("Transaction already committed or rolled back".to_string())
        })
    }
}

#[async_trait]
impl ProfileTransaction for PostgresProfileTransaction {
    async fn lock_profile(&mut self, installer_id: Uuid) -> Result<Option<ProfileRecord>> {
        let tx = self.tx_mut()?;

        sqlx::query_as::<_, ProfileRecord>(
            "SELECT id, user_id, business_name, bio, years_experience, is_available,
                    profile_completed, version
             FROM installer_profiles
             WHERE id = $1
             FOR UPDATE",
        )
        .bind(installer_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(Error::Database)
    }

    async fn update_profile_fields(
        &mut self,
        installer_id: Uuid,
        fields: &ProfileFields,
    ) -> Result<()> {
        let tx = self.tx_mut()?;

        sqlx::query(
            "UPDATE installer_profiles
             SET business_name = $2,
                 bio = $3,
                 years_experience = $4,
                 is_available = $5,
                 profile_completed = true
             WHERE id = $1",
        )
        .bind(installer_id)
        .bind(&fields.business_name)
        .bind(&fields.bio)
        .bind(fields.years_experience)
        .bind(fields.is_available)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    async fn replace_services(
        &mut self,
        installer_id: Uuid,
        category_ids: &[i32],
        primary_id: Option<i32>,
    ) -> Result<()> {
        let tx = self.tx_mut()?;

        sqlx::query("DELETE FROM installer_services WHERE installer_profile_id = $1")
            .bind(installer_id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;

        if category_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            "INSERT INTO installer_services (installer_profile_id, service_category_id, is_primary)
             SELECT $1, t.category_id, COALESCE(t.category_id = $3, false)
             FROM UNNEST($2::int4[]) WITH ORDINALITY AS t(category_id, ord)
             ORDER BY t.ord",
        )
        .bind(installer_id)
        .bind(category_ids.to_vec())
        .bind(primary_id)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    async fn replace_service_areas(&mut self, installer_id: Uuid, city_ids: &[i32]) -> Result<()> {
        let tx = self.tx_mut()?;

        sqlx::query("DELETE FROM installer_service_areas WHERE installer_profile_id = $1")
            .bind(installer_id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;

        if city_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            "INSERT INTO installer_service_areas (installer_profile_id, city_id)
             SELECT $1, t.city_id
             FROM UNNEST($2::int4[]) WITH ORDINALITY AS t(city_id, ord)
             ORDER BY t.ord",
        )
        .bind(installer_id)
        .bind(city_ids.to_vec())
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    async fn bump_version(&mut self, installer_id: Uuid) -> Result<i32> {
        let tx = self.tx_mut()?;

        sqlx::query_scalar::<_, i32>(
            "UPDATE installer_profiles
             SET version = version + 1, updated_at = NOW()
             WHERE id = $1
             RETURNING version",
        )
        .bind(installer_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(Error::Database)
    }

    async fn commit(mut self) -> Result<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| Error::Internal("Transaction already committed".to_string()))?;

        tx.commit().await.map_err(Error::Database)
    }

    async fn rollback(mut self) -> Result<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| Error::Internal("Transaction already rolled back".to_string()))?;

        tx.rollback().await.map_err(Error::Database)
    }
}
