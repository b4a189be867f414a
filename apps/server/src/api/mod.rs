//! API layer - routes, handlers, and middleware

pub mod envelope;
pub mod extractors;
pub mod handlers;
pub mod headers;
pub mod middleware;
pub mod routes;

use crate::{state::AppState, Error};
use axum::{extract::DefaultBodyLimit, routing::get, Router};

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let max_body_size = state.config.server.max_request_body_size;
    let cors_origins = state.config.server.cors_origins.clone();

    let api_router = routes::marketplace::marketplace_routes()
        .fallback(api_not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(routes::metrics::metrics_routes())
        .nest("/api", api_router)
        .with_state(state)
        // applied in reverse order
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::metrics_middleware))
        .layer(middleware::trace())
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(middleware::compression())
        .layer(middleware::cors(&cors_origins))
        .layer(DefaultBodyLimit::max(max_body_size))
}

async fn api_not_found() -> Error {
    Error::not_found("Route")
}
