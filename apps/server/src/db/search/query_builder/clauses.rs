use uuid::Uuid;

use super::{BindValue, Predicate, WhereClause};
use crate::db::search::params::InstallerFilters;
use crate::db::search::sort::AVERAGE_RATING_SQL;

/// Escape SQL LIKE meta-characters so user input is matched literally.
pub(crate) fn escape_like_pattern(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' | '%' | '_' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

pub(crate) fn profile_completed() -> Predicate {
    Predicate::fixed("ip.profile_completed = true")
}

/// One shared bind matched against business name, owner name and bio.
pub(crate) fn text_search(term: &str) -> Predicate {
    Predicate::new(
        "(ip.business_name ILIKE {0} ESCAPE '\\' OR u.name ILIKE {0} ESCAPE '\\' OR ip.bio ILIKE {0} ESCAPE '\\')",
        vec![BindValue::Text(format!("%{}%", escape_like_pattern(term)))],
    )
}

pub(crate) fn offers_service(category_id: i32) -> Predicate {
    Predicate::new(
        "EXISTS (SELECT 1 FROM installer_services s WHERE s.installer_profile_id = ip.id AND s.service_category_id = {0})",
        vec![BindValue::Int(category_id)],
    )
}

pub(crate) fn serves_city(city_id: i32) -> Predicate {
    Predicate::new(
        "EXISTS (SELECT 1 FROM installer_service_areas a WHERE a.installer_profile_id = ip.id AND a.city_id = {0})",
        vec![BindValue::Int(city_id)],
    )
}

pub(crate) fn serves_region(region_id: i32) -> Predicate {
    Predicate::new(
        "EXISTS (SELECT 1 FROM installer_service_areas a JOIN cities c ON c.id = a.city_id WHERE a.installer_profile_id = ip.id AND c.region_id = {0})",
        vec![BindValue::Int(region_id)],
    )
}

pub(crate) fn min_average_rating(threshold: f64) -> Predicate {
    Predicate::new(
        format!("{AVERAGE_RATING_SQL} >= {{0}}"),
        vec![BindValue::Float(threshold)],
    )
}

pub(crate) fn available() -> Predicate {
    Predicate::fixed("ip.is_available = true")
}

/// Translate typed filters into the installer WHERE clause.
///
/// The completed-profile condition always comes first; the remaining
/// predicates follow in a fixed order so equal inputs render equal SQL.
pub fn installer_filters(filters: &InstallerFilters) -> WhereClause {
    let mut clause = WhereClause::new();
    clause.push(profile_completed());

    if let Some(term) = filters.search.as_deref() {
        clause.push(text_search(term));
    }
    if let Some(id) = filters.service_id {
        clause.push(offers_service(id));
    }
    if let Some(id) = filters.city_id {
        clause.push(serves_city(id));
    }
    if let Some(id) = filters.region_id {
        clause.push(serves_region(id));
    }
    if let Some(threshold) = filters.rating_min {
        clause.push(min_average_rating(threshold));
    }
    if filters.available_only {
        clause.push(available());
    }

    clause
}

pub fn review_filters(installer_id: Uuid, rating: Option<i32>) -> WhereClause {
    let mut clause = WhereClause::new();
    clause.push(Predicate::new(
        "r.installer_profile_id = {0}",
        vec![BindValue::Uuid(installer_id)],
    ));
    if let Some(rating) = rating {
        clause.push(Predicate::new("r.rating = {0}", vec![BindValue::Int(rating)]));
    }
    clause
}

/// Rows belonging to one customer; `column` is the aliased owner column.
pub fn customer_filter(column: &str, customer_id: Uuid) -> WhereClause {
    let mut clause = WhereClause::new();
    clause.push(Predicate::new(
        format!("{column} = {{0}}"),
        vec![BindValue::Uuid(customer_id)],
    ));
    clause
}
