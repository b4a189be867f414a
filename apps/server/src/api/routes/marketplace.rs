//! Marketplace API routes, nested under `/api`

use crate::api::handlers::{catalog, customers, installers, reviews};
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};

pub fn marketplace_routes() -> Router<AppState> {
    Router::new()
        .route("/installers", get(installers::search_installers))
        .route(
            "/installers/:id",
            get(installers::get_installer).patch(installers::update_installer),
        )
        .route("/installers/:id/reviews", get(reviews::list_reviews))
        .route("/reviews", post(reviews::create_review))
        .route(
            "/reviews/:id",
            get(reviews::get_review)
                .patch(reviews::update_review)
                .delete(reviews::delete_review),
        )
        .route("/customers/:id/reviews", get(reviews::list_customer_reviews))
        .route(
            "/customers/:id/favorites",
            get(customers::list_favorites).post(customers::add_favorite),
        )
        .route(
            "/customers/:id/favorites/:favorite_id",
            delete(customers::remove_favorite),
        )
        .route(
            "/customers/:id/search-history",
            get(customers::list_search_history).post(customers::log_search),
        )
        .route("/services", get(catalog::list_services))
        .route("/locations/regions", get(catalog::list_regions))
        .route("/locations/cities", get(catalog::list_cities))
}
