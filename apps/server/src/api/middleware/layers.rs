//! Layer factories for middleware

use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    classify::{ServerErrorsAsFailures, SharedClassifier},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Per-request span and response logging. The request-id middleware owns
/// the root span, so these stay at DEBUG.
pub fn trace() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG))
}

/// CORS for the browser front end. No origins configured means no CORS
/// headers at all. `*` allows any origin but then credentials are not
/// allowed.
pub fn cors(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin.trim() == "*") {
        return base_cors().allow_origin(AllowOrigin::any());
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin.trim()).ok())
        .collect();

    if allowed.is_empty() {
        return CorsLayer::new();
    }

    base_cors()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
}

fn base_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::IF_MATCH,
            HeaderName::from_static("x-request-id"),
        ])
        .expose_headers([header::ETAG, HeaderName::from_static("x-request-id")])
}

pub fn compression() -> CompressionLayer {
    CompressionLayer::new()
}
