//! Metrics collection for the marketplace server
//!
//! Prometheus metrics are registered in the default registry on first use.

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter_vec, register_int_gauge_vec,
    Histogram, HistogramVec, IntCounterVec, IntGaugeVec,
};

lazy_static! {
    // HTTP Request Metrics

    /// Total HTTP requests by method, path, and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "marketplace_http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .expect("Failed to register HTTP_REQUESTS_TOTAL");

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "marketplace_http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");

    pub static ref HTTP_REQUESTS_IN_FLIGHT: IntGaugeVec = register_int_gauge_vec!(
        "marketplace_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
        &["method", "path"]
    )
    .expect("Failed to register HTTP_REQUESTS_IN_FLIGHT");

    // Marketplace Metrics

    /// Installer searches by outcome (ok, degraded, invalid)
    pub static ref SEARCH_TOTAL: IntCounterVec = register_int_counter_vec!(
        "marketplace_search_total",
        "Total number of installer searches",
        &["outcome"]
    )
    .expect("Failed to register SEARCH_TOTAL");

    /// Rows matched per installer search
    pub static ref SEARCH_RESULTS: Histogram = register_histogram!(
        "marketplace_search_results",
        "Number of installers matched by a search",
        vec![0.0, 1.0, 5.0, 12.0, 25.0, 50.0, 100.0, 500.0, 1000.0]
    )
    .expect("Failed to register SEARCH_RESULTS");

    /// Profile updates by outcome
    pub static ref PROFILE_UPDATES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "marketplace_profile_updates_total",
        "Total number of installer profile updates",
        &["outcome"]
    )
    .expect("Failed to register PROFILE_UPDATES_TOTAL");
}

fn looks_like_id(segment: &str) -> bool {
    !segment.is_empty()
        && (segment.chars().all(|c| c.is_ascii_digit())
            || (segment.len() == 36 && segment.chars().all(|c| c.is_ascii_hexdigit() || c == '-')))
}

/// Replace id-like path segments so label cardinality stays bounded.
pub fn sanitize_path(path: &str) -> String {
    if path.is_empty() || path == "/" {
        return "/".to_string();
    }

    path.split('/')
        .map(|segment| if looks_like_id(segment) { "{id}" } else { segment })
        .collect::<Vec<_>>()
        .join("/")
}
