//! Customer service - favorites and search history
//!
//! Every operation is scoped to the customer named in the path, and only
//! that customer may read or change their lists.

use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::Principal,
    db::{
        search::{Page, PageRequest},
        CustomerRepository, ReviewRepository,
    },
    models::{Favorite, FavoriteInstaller, NewFavorite, NewSearchHistory, SearchHistoryEntry},
    Error, Result,
};

/// Result of adding a favorite. Adding one twice is not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteAdded {
    pub favorite: Favorite,
    pub created: bool,
}

#[derive(Clone)]
pub struct CustomerService {
    customers: CustomerRepository,
    reviews: ReviewRepository,
}

impl CustomerService {
    pub fn new(customers: CustomerRepository, reviews: ReviewRepository) -> Self {
        Self { customers, reviews }
    }

    pub async fn favorites(
        &self,
        principal: &Principal,
        customer_id: Uuid,
        page: &PageRequest,
    ) -> Result<Page<FavoriteInstaller>> {
        principal.require_self(customer_id)?;

        let (data, total) = self.customers.list_favorites(customer_id, page).await?;
        Ok(Page::new(data, page, total))
    }

    #[tracing::instrument(skip(self, principal, favorite), fields(installer_id = %favorite.installer_profile_id))]
    pub async fn add_favorite(
        &self,
        principal: &Principal,
        customer_id: Uuid,
        favorite: NewFavorite,
    ) -> Result<FavoriteAdded> {
        principal.require_self(customer_id)?;

        let installer_id = favorite.installer_profile_id;
        match self.reviews.installer_completed(installer_id).await? {
            None => return Err(Error::not_found("Installer")),
            Some(false) => {
                return Err(Error::Validation(
                    "Installer profile is not completed".to_string(),
                ))
            }
            Some(true) => {}
        }

        if let Some(favorite) = self
            .customers
            .insert_favorite(customer_id, installer_id)
            .await?
        {
            tracing::info!(favorite_id = favorite.id, "Favorite added");
            return Ok(FavoriteAdded {
                favorite,
                created: true,
            });
        }

        // lost the insert to an existing row; a concurrent delete leaves nothing
        let favorite = self
            .customers
            .find_favorite(customer_id, installer_id)
            .await?
            .ok_or_else(|| Error::not_found("Favorite"))?;
        Ok(FavoriteAdded {
            favorite,
            created: false,
        })
    }

    pub async fn remove_favorite(
        &self,
        principal: &Principal,
        customer_id: Uuid,
        favorite_id: i32,
    ) -> Result<()> {
        principal.require_self(customer_id)?;

        if !self
            .customers
            .delete_favorite(customer_id, favorite_id)
            .await?
        {
            return Err(Error::not_found("Favorite"));
        }
        tracing::info!(favorite_id, "Favorite removed");
        Ok(())
    }

    pub async fn search_history(
        &self,
        principal: &Principal,
        customer_id: Uuid,
        page: &PageRequest,
    ) -> Result<Page<SearchHistoryEntry>> {
        principal.require_self(customer_id)?;

        let (data, total) = self.customers.list_search_history(customer_id, page).await?;
        Ok(Page::new(data, page, total))
    }

    pub async fn log_search(
        &self,
        principal: &Principal,
        customer_id: Uuid,
        entry: NewSearchHistory,
    ) -> Result<SearchHistoryEntry> {
        principal.require_self(customer_id)?;

        entry.validate()?;
        if !entry.has_criteria() {
            return Err(Error::field(
                "search_query",
                "At least one search parameter is required",
            ));
        }

        self.customers.insert_search(customer_id, &entry).await
    }
}
