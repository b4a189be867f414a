//! Reference data: service categories and locations

use axum::{extract::State, response::IntoResponse};

use crate::{
    api::{envelope, extractors::QueryPairs},
    db::search::parse_id,
    models::CategoryNode,
    state::AppState,
    Result,
};

/// GET /api/services
pub async fn list_services(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let categories = state.catalog.active_categories().await?;
    Ok(envelope::listing(CategoryNode::build_tree(categories)))
}

/// GET /api/locations/regions
pub async fn list_regions(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(envelope::listing(state.catalog.regions().await?))
}

/// GET /api/locations/cities
pub async fn list_cities(
    State(state): State<AppState>,
    QueryPairs(query): QueryPairs,
) -> Result<impl IntoResponse> {
    let region_id = parse_id("region_id", query.get("region_id").map(String::as_str))?;
    Ok(envelope::listing(state.catalog.cities(region_id).await?))
}
