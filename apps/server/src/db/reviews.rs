//! Review repository - reads, writes and rating aggregates

use sqlx::PgPool;
use uuid::Uuid;

use super::search::{
    customer_reviews_query, review_list_query, PageRequest, ReviewListParams, REVIEW_SELECT,
};
use super::{fetch_page, is_unique_violation};
use crate::{
    models::{
        CreatedReview, CustomerReview, NewReview, RatingStats, Review, ReviewOwner, ReviewPatch,
        UpdatedReview,
    },
    Error, Result,
};

#[derive(Clone)]
pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One page of reviews and the total matching the same filters.
    pub async fn list(&self, params: &ReviewListParams) -> Result<(Vec<Review>, i64)> {
        fetch_page(&self.pool, &review_list_query(params), &params.page).await
    }

    /// Reviews written by one customer, newest first.
    pub async fn list_for_customer(
        &self,
        customer_id: Uuid,
        page: &PageRequest,
    ) -> Result<(Vec<CustomerReview>, i64)> {
        fetch_page(&self.pool, &customer_reviews_query(customer_id), page).await
    }

    /// Aggregate live review rows for one installer.
    pub async fn stats(&self, installer_id: Uuid) -> Result<RatingStats> {
        let histogram = sqlx::query_as::<_, (i32, i64)>(
            "SELECT rating, COUNT(*)
             FROM reviews
             WHERE installer_profile_id = $1
             GROUP BY rating",
        )
        .bind(installer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(RatingStats::from_histogram(histogram))
    }

    pub async fn get(&self, review_id: Uuid) -> Result<Option<Review>> {
        let sql = format!(
            "SELECT {REVIEW_SELECT}
             FROM reviews r
             JOIN users u ON u.id = r.customer_id
             JOIN service_categories sc ON sc.id = r.service_category_id
             WHERE r.id = $1"
        );

        sqlx::query_as::<_, Review>(&sql)
            .bind(review_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)
    }

    pub async fn owner(&self, review_id: Uuid) -> Result<Option<ReviewOwner>> {
        sqlx::query_as::<_, ReviewOwner>(
            "SELECT id, customer_id, installer_profile_id FROM reviews WHERE id = $1",
        )
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)
    }

    /// `Some(profile_completed)` when the installer exists.
    pub async fn installer_completed(&self, installer_id: Uuid) -> Result<Option<bool>> {
        sqlx::query_scalar::<_, bool>(
            "SELECT profile_completed FROM installer_profiles WHERE id = $1",
        )
        .bind(installer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)
    }

    pub async fn installer_exists(&self, installer_id: Uuid) -> Result<bool> {
        Ok(self.installer_completed(installer_id).await?.is_some())
    }

    pub async fn has_reviewed(&self, customer_id: Uuid, installer_id: Uuid) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                SELECT 1 FROM reviews
                WHERE customer_id = $1 AND installer_profile_id = $2
             )",
        )
        .bind(customer_id)
        .bind(installer_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)
    }

    pub async fn category_exists(&self, category_id: i32) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM service_categories WHERE id = $1)",
        )
        .bind(category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)
    }

    pub async fn insert(&self, customer_id: Uuid, review: &NewReview) -> Result<CreatedReview> {
        sqlx::query_as::<_, CreatedReview>(
            "INSERT INTO reviews (
                installer_profile_id, customer_id, service_category_id,
                rating, title, comment, work_completed_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id, created_at",
        )
        .bind(review.installer_profile_id)
        .bind(customer_id)
        .bind(review.service_category_id)
        .bind(review.rating)
        .bind(review.title.trim())
        .bind(review.comment.trim())
        .bind(review.work_completed_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // A concurrent insert can slip past the existence check
            if is_unique_violation(&e) {
                Error::Conflict("You have already reviewed this installer".to_string())
            } else {
                Error::Database(e)
            }
        })
    }

    /// Overwrite the fields present in `patch`; returns `None` if the review vanished.
    pub async fn update(&self, review_id: Uuid, patch: &ReviewPatch) -> Result<Option<UpdatedReview>> {
        sqlx::query_as::<_, UpdatedReview>(
            "UPDATE reviews
             SET rating = COALESCE($2, rating),
                 title = COALESCE($3, title),
                 comment = COALESCE($4, comment),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING id, updated_at",
        )
        .bind(review_id)
        .bind(patch.rating)
        .bind(patch.title.as_deref().map(str::trim))
        .bind(patch.comment.as_deref().map(str::trim))
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)
    }

    pub async fn delete(&self, review_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }
}
