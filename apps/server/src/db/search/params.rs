//! Listing parameter parsing and validation
//!
//! Raw query-string values are turned into typed filters here, before any
//! SQL is built. Empty values count as absent; malformed ids, thresholds and
//! flags are rejected with field-level validation errors.

use std::collections::HashMap;

use uuid::Uuid;

use super::pagination::PageRequest;
use super::sort::{InstallerSort, ReviewSort};
use crate::config::SearchConfig;
use crate::error::FieldIssue;
use crate::{Error, Result};

/// Typed installer filters. `None` / `false` omit the predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstallerFilters {
    pub search: Option<String>,
    pub service_id: Option<i32>,
    pub city_id: Option<i32>,
    pub region_id: Option<i32>,
    pub rating_min: Option<f64>,
    pub available_only: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstallerSearchParams {
    pub filters: InstallerFilters,
    pub sort: InstallerSort,
    pub page: PageRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewListParams {
    pub installer_id: Uuid,
    pub rating: Option<i32>,
    pub sort: ReviewSort,
    pub page: PageRequest,
}

/// Collects every field issue so the client sees all problems at once.
#[derive(Default)]
struct IssueCollector {
    issues: Vec<FieldIssue>,
}

impl IssueCollector {
    fn capture<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(Error::InvalidFields(mut issues)) => {
                self.issues.append(&mut issues);
                None
            }
            Err(other) => {
                self.issues.push(FieldIssue::new("query", other.to_string()));
                None
            }
        }
    }

    fn finish(self) -> Result<()> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidFields(self.issues))
        }
    }
}

fn raw<'a>(query: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    query
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

/// Parse a positive integer id.
pub fn parse_id(field: &str, value: Option<&str>) -> Result<Option<i32>> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value.parse::<i32>() {
        Ok(id) if id > 0 => Ok(Some(id)),
        _ => Err(Error::field(field, format!("{field} must be a positive integer"))),
    }
}

fn parse_rating_min(value: Option<&str>) -> Result<Option<f64>> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && (0.0..=5.0).contains(&v) => Ok(Some(v)),
        _ => Err(Error::field(
            "rating_min",
            "rating_min must be a number between 0 and 5",
        )),
    }
}

fn parse_flag(field: &str, value: Option<&str>) -> Result<bool> {
    match value.map(|v| v.to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) if v == "true" || v == "1" => Ok(true),
        Some(v) if v == "false" || v == "0" => Ok(false),
        Some(_) => Err(Error::field(field, format!("{field} must be true or false"))),
    }
}

fn parse_review_rating(value: Option<&str>) -> Result<Option<i32>> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value.parse::<i32>() {
        Ok(r) if (1..=5).contains(&r) => Ok(Some(r)),
        _ => Err(Error::field("rating", "rating must be an integer between 1 and 5")),
    }
}

/// Parse a path id that must be a UUID.
pub fn parse_uuid(field: &str, value: &str) -> Result<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|_| Error::field(field, format!("{field} must be a valid UUID")))
}

/// `page` / `limit` of a customer's own listings. These share the smaller
/// sub-listing page size with installer reviews.
pub fn customer_listing_page(
    query: &HashMap<String, String>,
    config: &SearchConfig,
) -> Result<PageRequest> {
    PageRequest::parse(
        raw(query, "page"),
        raw(query, "limit"),
        config.review_page_size,
        config.max_page_size,
    )
}

impl InstallerSearchParams {
    pub fn from_query(query: &HashMap<String, String>, config: &SearchConfig) -> Result<Self> {
        let mut issues = IssueCollector::default();

        let service_id = issues.capture(parse_id("service_id", raw(query, "service_id")));
        let city_id = issues.capture(parse_id("city_id", raw(query, "city_id")));
        let region_id = issues.capture(parse_id("region_id", raw(query, "region_id")));
        let rating_min = issues.capture(parse_rating_min(raw(query, "rating_min")));
        let available_only = issues.capture(parse_flag("available", raw(query, "available")));
        let page = issues.capture(PageRequest::parse(
            raw(query, "page"),
            raw(query, "limit"),
            config.default_page_size,
            config.max_page_size,
        ));

        issues.finish()?;

        let filters = InstallerFilters {
            search: raw(query, "search").map(str::to_string),
            service_id: service_id.flatten(),
            city_id: city_id.flatten(),
            region_id: region_id.flatten(),
            rating_min: rating_min.flatten(),
            available_only: available_only.unwrap_or(false),
        };

        Ok(Self {
            filters,
            sort: InstallerSort::parse(raw(query, "sort")),
            page: page.unwrap_or(PageRequest {
                page: 1,
                limit: config.default_page_size,
            }),
        })
    }
}

impl ReviewListParams {
    pub fn from_query(
        installer_id: Uuid,
        query: &HashMap<String, String>,
        config: &SearchConfig,
    ) -> Result<Self> {
        let mut issues = IssueCollector::default();

        let rating = issues.capture(parse_review_rating(raw(query, "rating")));
        let page = issues.capture(PageRequest::parse(
            raw(query, "page"),
            raw(query, "limit"),
            config.review_page_size,
            config.max_page_size,
        ));

        issues.finish()?;

        Ok(Self {
            installer_id,
            rating: rating.flatten(),
            sort: ReviewSort::parse(raw(query, "sort")),
            page: page.unwrap_or(PageRequest {
                page: 1,
                limit: config.review_page_size,
            }),
        })
    }
}
