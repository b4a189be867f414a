//! A customer's own favorites and search history

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    api::{
        envelope,
        extractors::{FavoritePath, JsonBody, QueryPairs, UuidPath},
    },
    auth::AuthenticatedPrincipal,
    db::search::customer_listing_page,
    models::{NewFavorite, NewSearchHistory},
    state::AppState,
    Result,
};

/// GET /api/customers/:id/favorites
pub async fn list_favorites(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    UuidPath(customer_id): UuidPath,
    QueryPairs(query): QueryPairs,
) -> Result<impl IntoResponse> {
    let page = customer_listing_page(&query, &state.config.search)?;
    let favorites = state
        .customers
        .favorites(&principal, customer_id, &page)
        .await?;
    Ok(envelope::success(favorites))
}

/// POST /api/customers/:id/favorites
pub async fn add_favorite(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    UuidPath(customer_id): UuidPath,
    JsonBody(favorite): JsonBody<NewFavorite>,
) -> Result<impl IntoResponse> {
    state.rate_limiter.check(&principal.rate_limit_key())?;
    let added = state
        .customers
        .add_favorite(&principal, customer_id, favorite)
        .await?;

    Ok(if added.created {
        (
            StatusCode::CREATED,
            envelope::data_with_message(added.favorite, "Installer added to favorites"),
        )
    } else {
        (
            StatusCode::OK,
            envelope::data_with_message(added.favorite, "Installer was already in favorites"),
        )
    })
}

/// DELETE /api/customers/:id/favorites/:favorite_id
pub async fn remove_favorite(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    path: FavoritePath,
) -> Result<impl IntoResponse> {
    state.rate_limiter.check(&principal.rate_limit_key())?;
    state
        .customers
        .remove_favorite(&principal, path.customer_id, path.favorite_id)
        .await?;
    Ok(envelope::message("Favorite removed"))
}

/// GET /api/customers/:id/search-history
pub async fn list_search_history(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    UuidPath(customer_id): UuidPath,
    QueryPairs(query): QueryPairs,
) -> Result<impl IntoResponse> {
    let page = customer_listing_page(&query, &state.config.search)?;
    let history = state
        .customers
        .search_history(&principal, customer_id, &page)
        .await?;
    Ok(envelope::success(history))
}

/// POST /api/customers/:id/search-history
pub async fn log_search(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    UuidPath(customer_id): UuidPath,
    JsonBody(entry): JsonBody<NewSearchHistory>,
) -> Result<impl IntoResponse> {
    state.rate_limiter.check(&principal.rate_limit_key())?;
    let logged = state
        .customers
        .log_search(&principal, customer_id, entry)
        .await?;
    Ok((
        StatusCode::CREATED,
        envelope::data_with_message(logged, "Search logged"),
    ))
}
