//! Listing queries: filter predicates, ranking and pagination.

pub mod pagination;
pub mod params;
pub mod query_builder;
pub mod sort;

pub use pagination::{Page, PageRequest, Pagination};
pub use params::{
    customer_listing_page, parse_id, parse_uuid, InstallerFilters, InstallerSearchParams,
    ReviewListParams,
};
pub use query_builder::{BindValue, PagedQuery, Predicate, WhereClause};
pub use sort::{InstallerSort, ReviewSort};

use query_builder::clauses;
use uuid::Uuid;

const INSTALLER_FROM: &str = "installer_profiles ip JOIN users u ON u.id = ip.user_id";

const INSTALLER_SELECT: &str = "ip.id, ip.user_id, ip.business_name, ip.bio, ip.years_experience, \
     ip.is_verified, ip.is_available, ip.created_at, \
     u.name AS owner_name, u.avatar_url AS owner_avatar_url, \
     (SELECT COALESCE(AVG(r.rating), 0) FROM reviews r WHERE r.installer_profile_id = ip.id)::float8 AS average_rating, \
     (SELECT COUNT(*) FROM reviews r WHERE r.installer_profile_id = ip.id) AS review_count";

const REVIEW_FROM: &str = "reviews r \
     JOIN users u ON u.id = r.customer_id \
     JOIN service_categories sc ON sc.id = r.service_category_id";

pub(crate) const REVIEW_SELECT: &str = "r.id, r.installer_profile_id, r.customer_id, \
     u.name AS customer_name, u.avatar_url AS customer_avatar_url, \
     r.service_category_id, sc.name_ro AS service_name, \
     r.rating, r.title, r.comment, r.work_completed_at, r.is_verified, r.helpful_count, \
     r.created_at, r.updated_at";

const CUSTOMER_REVIEW_FROM: &str = "reviews r \
     JOIN installer_profiles ip ON ip.id = r.installer_profile_id \
     JOIN users u ON u.id = ip.user_id \
     LEFT JOIN service_categories sc ON sc.id = r.service_category_id";

const CUSTOMER_REVIEW_SELECT: &str = "r.id, r.installer_profile_id, r.service_category_id, \
     r.rating, r.title, r.comment, r.work_completed_at, r.is_verified, r.helpful_count, \
     r.created_at, r.updated_at, \
     ip.business_name AS installer_business_name, u.name AS installer_name, \
     u.avatar_url AS installer_avatar, ip.is_verified AS installer_verified, \
     sc.name_ro AS service_name, \
     COALESCE(ip.business_name, u.name) AS installer_display_name";

const FAVORITE_FROM: &str = "customer_favorites cf \
     JOIN installer_profiles ip ON ip.id = cf.installer_profile_id \
     JOIN users u ON u.id = ip.user_id";

const FAVORITE_SELECT: &str = "cf.id, cf.customer_id, cf.installer_profile_id, cf.created_at, \
     COALESCE(ip.business_name, u.name) AS installer_name, \
     ip.business_name AS installer_business_name, \
     u.avatar_url AS installer_avatar, ip.is_verified AS installer_verified, \
     (SELECT COALESCE(AVG(r.rating), 0) FROM reviews r WHERE r.installer_profile_id = ip.id)::float8 AS installer_rating, \
     (SELECT COUNT(*) FROM reviews r WHERE r.installer_profile_id = ip.id) AS installer_review_count, \
     (SELECT sc.name_ro FROM installer_services s \
        JOIN service_categories sc ON sc.id = s.service_category_id \
        WHERE s.installer_profile_id = ip.id AND s.is_primary = true LIMIT 1) AS primary_service, \
     (SELECT COUNT(*) FROM installer_service_areas a WHERE a.installer_profile_id = ip.id) AS service_area_count";

const SEARCH_HISTORY_FROM: &str = "customer_search_history sh \
     LEFT JOIN service_categories sc ON sc.id = sh.service_category_id \
     LEFT JOIN cities c ON c.id = sh.city_id \
     LEFT JOIN regions rg ON rg.id = sh.region_id";

pub(crate) const SEARCH_HISTORY_SELECT: &str = "sh.id, sh.customer_id, sh.search_query, \
     sh.service_category_id, sh.city_id, sh.region_id, sh.results_count, sh.created_at, \
     sc.name_ro AS service_name, c.name AS city_name, rg.name AS region_name";

pub fn installer_search_query(params: &InstallerSearchParams) -> PagedQuery {
    PagedQuery {
        select: INSTALLER_SELECT,
        from: INSTALLER_FROM,
        filters: clauses::installer_filters(&params.filters),
        order_by: params.sort.order_by(),
    }
}

pub fn review_list_query(params: &ReviewListParams) -> PagedQuery {
    PagedQuery {
        select: REVIEW_SELECT,
        from: REVIEW_FROM,
        filters: clauses::review_filters(params.installer_id, params.rating),
        order_by: params.sort.order_by(),
    }
}

pub fn customer_reviews_query(customer_id: Uuid) -> PagedQuery {
    PagedQuery {
        select: CUSTOMER_REVIEW_SELECT,
        from: CUSTOMER_REVIEW_FROM,
        filters: clauses::customer_filter("r.customer_id", customer_id),
        order_by: ReviewSort::Newest.order_by(),
    }
}

pub fn favorites_query(customer_id: Uuid) -> PagedQuery {
    PagedQuery {
        select: FAVORITE_SELECT,
        from: FAVORITE_FROM,
        filters: clauses::customer_filter("cf.customer_id", customer_id),
        order_by: "cf.created_at DESC, cf.id DESC",
    }
}

pub fn search_history_query(customer_id: Uuid) -> PagedQuery {
    PagedQuery {
        select: SEARCH_HISTORY_SELECT,
        from: SEARCH_HISTORY_FROM,
        filters: clauses::customer_filter("sh.customer_id", customer_id),
        order_by: "sh.created_at DESC, sh.id DESC",
    }
}
