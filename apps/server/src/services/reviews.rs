//! Review service - listing with aggregates, and author-scoped writes

use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{Principal, Role},
    db::{
        search::{Page, PageRequest, Pagination, ReviewListParams},
        ReviewRepository,
    },
    models::{
        CreatedReview, CustomerReview, NewReview, RatingStats, Review, ReviewOwner, ReviewPatch,
        UpdatedReview,
    },
    Error, Result,
};

/// A page of reviews with the installer's overall stats.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewPage {
    pub data: Vec<Review>,
    pub pagination: Pagination,
    pub stats: RatingStats,
}

#[derive(Clone)]
pub struct ReviewService {
    repo: ReviewRepository,
}

impl ReviewService {
    pub fn new(repo: ReviewRepository) -> Self {
        Self { repo }
    }

    /// Reviews for one installer. Stats always cover every review, whatever
    /// the rating filter.
    pub async fn list(&self, params: &ReviewListParams) -> Result<ReviewPage> {
        if !self.repo.installer_exists(params.installer_id).await? {
            return Err(Error::not_found("Installer"));
        }

        let ((data, total), stats) = futures::try_join!(
            self.repo.list(params),
            self.repo.stats(params.installer_id)
        )?;

        Ok(ReviewPage {
            data,
            pagination: Pagination::new(&params.page, total),
            stats,
        })
    }

    /// Reviews the caller has written, newest first.
    pub async fn list_for_customer(
        &self,
        principal: &Principal,
        customer_id: Uuid,
        page: &PageRequest,
    ) -> Result<Page<CustomerReview>> {
        principal.require_self(customer_id)?;

        let (data, total) = self.repo.list_for_customer(customer_id, page).await?;
        Ok(Page::new(data, page, total))
    }

    pub async fn stats_for(&self, installer_id: Uuid) -> Result<RatingStats> {
        self.repo.stats(installer_id).await
    }

    pub async fn get(&self, review_id: Uuid) -> Result<Review> {
        self.repo
            .get(review_id)
            .await?
            .ok_or_else(|| Error::not_found("Review"))
    }

    #[tracing::instrument(skip(self, review), fields(customer_id = %principal.user_id, installer_id = %review.installer_profile_id))]
    pub async fn create(&self, principal: &Principal, review: NewReview) -> Result<CreatedReview> {
        if principal.role != Role::Customer {
            return Err(Error::Forbidden(
                "Only customers can leave reviews".to_string(),
            ));
        }

        review.validate()?;

        match self.repo.installer_completed(review.installer_profile_id).await? {
            None => return Err(Error::not_found("Installer")),
            Some(false) => {
                return Err(Error::Validation(
                    "Cannot review an incomplete installer profile".to_string(),
                ))
            }
            Some(true) => {}
        }

        if self
            .repo
            .has_reviewed(principal.user_id, review.installer_profile_id)
            .await?
        {
            return Err(Error::Conflict(
                "You have already reviewed this installer".to_string(),
            ));
        }

        if !self.repo.category_exists(review.service_category_id).await? {
            return Err(Error::field(
                "service_category_id",
                "Service category does not exist",
            ));
        }

        let created = self.repo.insert(principal.user_id, &review).await?;
        tracing::info!(review_id = %created.id, "Review created");
        Ok(created)
    }

    pub async fn update(
        &self,
        principal: &Principal,
        review_id: Uuid,
        patch: ReviewPatch,
    ) -> Result<UpdatedReview> {
        patch.validate()?;
        if patch.is_empty() {
            return Err(Error::Validation("No changes specified".to_string()));
        }

        self.authorize_author(principal, review_id).await?;

        self.repo
            .update(review_id, &patch)
            .await?
            .ok_or_else(|| Error::not_found("Review"))
    }

    pub async fn delete(&self, principal: &Principal, review_id: Uuid) -> Result<()> {
        self.authorize_author(principal, review_id).await?;

        if !self.repo.delete(review_id).await? {
            return Err(Error::not_found("Review"));
        }
        tracing::info!(review_id = %review_id, "Review deleted");
        Ok(())
    }

    async fn authorize_author(&self, principal: &Principal, review_id: Uuid) -> Result<ReviewOwner> {
        let owner = self
            .repo
            .owner(review_id)
            .await?
            .ok_or_else(|| Error::not_found("Review"))?;

        if owner.customer_id != principal.user_id {
            return Err(Error::Forbidden(
                "You can only modify your own reviews".to_string(),
            ));
        }
        Ok(owner)
    }
}
