//! Page window arithmetic.

use serde::Serialize;

use crate::{Error, Result};

/// A validated page request: `page >= 1`, `1 <= limit <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Parse raw `page` / `limit` query values.
    ///
    /// Absent or empty values fall back to page 1 and `default_limit`.
    /// Non-integers are rejected; integers outside the window are clamped.
    pub fn parse(
        page: Option<&str>,
        limit: Option<&str>,
        default_limit: u32,
        max_limit: u32,
    ) -> Result<Self> {
        let page = parse_int("page", page)?.unwrap_or(1);
        let limit = parse_int("limit", limit)?.unwrap_or(i64::from(default_limit));
        Ok(Self::clamped(page, limit, max_limit))
    }

    pub fn clamped(page: i64, limit: i64, max_limit: u32) -> Self {
        let max_limit = max_limit.max(1);
        Self {
            page: page.clamp(1, i64::from(u32::MAX)) as u32,
            limit: limit.clamp(1, i64::from(max_limit)) as u32,
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

fn parse_int(name: &str, raw: Option<&str>) -> Result<Option<i64>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<i64>()
            .map(Some)
            .map_err(|_| Error::field(name, format!("{name} must be an integer"))),
    }
}

/// Pagination block returned with every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(request: &PageRequest, total: i64) -> Self {
        let total = total.max(0);
        let limit = i64::from(request.limit);
        let total_pages = (total + limit - 1) / limit;
        Self {
            page: request.page,
            limit: request.limit,
            total,
            total_pages,
            has_more: i64::from(request.page) < total_pages,
        }
    }

    /// Zeroed block used when a listing could not be produced.
    pub fn empty(request: &PageRequest) -> Self {
        Self::new(request, 0)
    }
}

/// One page of rows with its pagination block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, request: &PageRequest, total: i64) -> Self {
        Self {
            data,
            pagination: Pagination::new(request, total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_page_minus_one_times_limit() {
        assert_eq!(PageRequest { page: 1, limit: 12 }.offset(), 0);
        assert_eq!(PageRequest { page: 2, limit: 12 }.offset(), 12);
        assert_eq!(PageRequest { page: 5, limit: 50 }.offset(), 200);
    }

    #[test]
    fn defaults_apply_when_absent_or_empty() {
        let req = PageRequest::parse(None, None, 12, 50).unwrap();
        assert_eq!(req, PageRequest { page: 1, limit: 12 });

        let req = PageRequest::parse(Some(""), Some(" "), 10, 50).unwrap();
        assert_eq!(req, PageRequest { page: 1, limit: 10 });
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let req = PageRequest::parse(Some("0"), Some("500"), 12, 50).unwrap();
        assert_eq!(req, PageRequest { page: 1, limit: 50 });

        let req = PageRequest::parse(Some("-3"), Some("0"), 12, 50).unwrap();
        assert_eq!(req, PageRequest { page: 1, limit: 1 });
    }

    #[test]
    fn non_integer_values_are_rejected() {
        assert!(matches!(
            PageRequest::parse(Some("two"), None, 12, 50),
            Err(Error::InvalidFields(_))
        ));
        assert!(PageRequest::parse(None, Some("1.5"), 12, 50).is_err());
    }

    #[test]
    fn total_pages_is_ceiling_of_total_over_limit() {
        let req = PageRequest { page: 1, limit: 12 };
        assert_eq!(Pagination::new(&req, 0).total_pages, 0);
        assert_eq!(Pagination::new(&req, 1).total_pages, 1);
        assert_eq!(Pagination::new(&req, 12).total_pages, 1);
        assert_eq!(Pagination::new(&req, 13).total_pages, 2);
        assert_eq!(Pagination::new(&req, 25).total_pages, 3);
    }

    #[test]
    fn has_more_only_before_last_page() {
        let p = Pagination::new(&PageRequest { page: 1, limit: 10 }, 25);
        assert!(p.has_more);
        let p = Pagination::new(&PageRequest { page: 3, limit: 10 }, 25);
        assert!(!p.has_more);
        let p = Pagination::new(&PageRequest { page: 4, limit: 10 }, 25);
        assert!(!p.has_more);
    }

    #[test]
    fn serializes_camel_case() {
        let p = Pagination::new(&PageRequest { page: 1, limit: 12 }, 13);
        let json = serde_json::to_value(p).unwrap();
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["hasMore"], true);
    }
}
