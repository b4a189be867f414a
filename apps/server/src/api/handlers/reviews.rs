//! Review listing and author-scoped review writes

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    api::{
        envelope,
        extractors::{JsonBody, QueryPairs, UuidPath},
    },
    auth::AuthenticatedPrincipal,
    db::search::{customer_listing_page, ReviewListParams},
    models::{NewReview, ReviewPatch},
    state::AppState,
    Result,
};

/// GET /api/installers/:id/reviews
pub async fn list_reviews(
    State(state): State<AppState>,
    UuidPath(installer_id): UuidPath,
    QueryPairs(query): QueryPairs,
) -> Result<impl IntoResponse> {
    let params = ReviewListParams::from_query(installer_id, &query, &state.config.search)?;
    let page = state.reviews.list(&params).await?;
    Ok(envelope::success(page))
}

/// GET /api/customers/:id/reviews
pub async fn list_customer_reviews(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    UuidPath(customer_id): UuidPath,
    QueryPairs(query): QueryPairs,
) -> Result<impl IntoResponse> {
    let page = customer_listing_page(&query, &state.config.search)?;
    let reviews = state
        .reviews
        .list_for_customer(&principal, customer_id, &page)
        .await?;
    Ok(envelope::success(reviews))
}

/// POST /api/reviews
pub async fn create_review(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    JsonBody(review): JsonBody<NewReview>,
) -> Result<impl IntoResponse> {
    state.rate_limiter.check(&principal.rate_limit_key())?;
    let created = state.reviews.create(&principal, review).await?;
    Ok((StatusCode::CREATED, envelope::data(created)))
}

/// GET /api/reviews/:id
pub async fn get_review(
    State(state): State<AppState>,
    UuidPath(review_id): UuidPath,
) -> Result<impl IntoResponse> {
    let review = state.reviews.get(review_id).await?;
    Ok(envelope::data(review))
}

/// PATCH /api/reviews/:id
pub async fn update_review(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    UuidPath(review_id): UuidPath,
    JsonBody(patch): JsonBody<ReviewPatch>,
) -> Result<impl IntoResponse> {
    state.rate_limiter.check(&principal.rate_limit_key())?;
    let updated = state.reviews.update(&principal, review_id, patch).await?;
    Ok(envelope::data(updated))
}

/// DELETE /api/reviews/:id
pub async fn delete_review(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    UuidPath(review_id): UuidPath,
) -> Result<impl IntoResponse> {
    state.rate_limiter.check(&principal.rate_limit_key())?;
    state.reviews.delete(&principal, review_id).await?;
    Ok(envelope::message("Review deleted"))
}
