//! Conditional-request headers for profile updates
//!
//! Profile versions travel as weak ETags: `W/"7"`.

use axum::http::{header, HeaderMap, HeaderValue};

use crate::{Error, Result};

/// Parse a weak or strong ETag into a version number.
///
/// ```
/// use marketplace::api::headers::parse_etag;
/// assert_eq!(parse_etag("W/\"3\""), Some(3));
/// assert_eq!(parse_etag("\"3\""), Some(3));
/// assert_eq!(parse_etag("three"), None);
/// ```
pub fn parse_etag(etag: &str) -> Option<i32> {
    let etag = etag.trim();
    let quoted = etag.strip_prefix("W/").unwrap_or(etag);
    quoted
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .and_then(|s| s.parse().ok())
}

pub fn format_etag(version: i32) -> String {
    format!("W/\"{}\"", version)
}

pub fn etag_header(version: i32) -> Option<(header::HeaderName, HeaderValue)> {
    HeaderValue::from_str(&format_etag(version))
        .ok()
        .map(|v| (header::ETAG, v))
}

/// Expected version from `If-Match`, if the caller sent one.
///
/// `*` matches any version. Anything else that is not a version ETag is
/// rejected rather than silently ignored.
pub fn extract_if_match(headers: &HeaderMap) -> Result<Option<i32>> {
    let Some(value) = headers.get(header::IF_MATCH) else {
        return Ok(None);
    };

    let raw = value
        .to_str()
        .map_err(|_| Error::Validation("Invalid If-Match header".to_string()))?
        .trim();

    if raw == "*" {
        return Ok(None);
    }

    parse_etag(raw)
        .map(Some)
        .ok_or_else(|| Error::Validation(format!("Invalid If-Match header: {raw}")))
}
