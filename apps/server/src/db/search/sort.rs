//! Ranking strategies for installer and review listings.

/// Average of live review ratings for the installer row `ip`.
pub(crate) const AVERAGE_RATING_SQL: &str =
    "(SELECT COALESCE(AVG(r.rating), 0) FROM reviews r WHERE r.installer_profile_id = ip.id)::float8";

/// Number of live reviews for the installer row `ip`.
pub(crate) const REVIEW_COUNT_SQL: &str =
    "(SELECT COUNT(*) FROM reviews r WHERE r.installer_profile_id = ip.id)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstallerSort {
    #[default]
    Rating,
    Reviews,
}

impl InstallerSort {
    /// Unknown or missing keys rank by rating.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("reviews") => InstallerSort::Reviews,
            _ => InstallerSort::Rating,
        }
    }

    /// ORDER BY body, always ending with the installer id tie-break.
    pub fn order_by(self) -> &'static str {
        match self {
            InstallerSort::Rating => {
                "average_rating DESC, ip.is_verified DESC, ip.id ASC"
            }
            InstallerSort::Reviews => "review_count DESC, ip.id ASC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewSort {
    #[default]
    Newest,
    Highest,
    Lowest,
    Helpful,
}

impl ReviewSort {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("highest") => ReviewSort::Highest,
            Some("lowest") => ReviewSort::Lowest,
            Some("helpful") => ReviewSort::Helpful,
            _ => ReviewSort::Newest,
        }
    }

    pub fn order_by(self) -> &'static str {
        match self {
            ReviewSort::Newest => "r.created_at DESC, r.id ASC",
            ReviewSort::Highest => "r.rating DESC, r.created_at DESC, r.id ASC",
            ReviewSort::Lowest => "r.rating ASC, r.created_at DESC, r.id ASC",
            ReviewSort::Helpful => "r.helpful_count DESC, r.created_at DESC, r.id ASC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_installer_sort_falls_back_to_rating() {
        assert_eq!(InstallerSort::parse(None), InstallerSort::Rating);
        assert_eq!(InstallerSort::parse(Some("price")), InstallerSort::Rating);
        assert_eq!(InstallerSort::parse(Some("")), InstallerSort::Rating);
        assert_eq!(
            InstallerSort::parse(Some("bogus")).order_by(),
            InstallerSort::Rating.order_by()
        );
        assert_eq!(InstallerSort::parse(Some("reviews")), InstallerSort::Reviews);
    }

    #[test]
    fn every_order_ends_with_a_unique_tie_break() {
        for sort in [InstallerSort::Rating, InstallerSort::Reviews] {
            assert!(sort.order_by().ends_with("ip.id ASC"));
        }
        for sort in [
            ReviewSort::Newest,
            ReviewSort::Highest,
            ReviewSort::Lowest,
            ReviewSort::Helpful,
        ] {
            assert!(sort.order_by().ends_with("r.id ASC"));
        }
    }

    #[test]
    fn rating_sort_prefers_verified_on_equal_average() {
        let order = InstallerSort::Rating.order_by();
        let avg = order.find("average_rating DESC").unwrap();
        let verified = order.find("ip.is_verified DESC").unwrap();
        assert!(avg < verified);
    }

    #[test]
    fn review_sort_keys() {
        assert_eq!(ReviewSort::parse(Some("lowest")), ReviewSort::Lowest);
        assert_eq!(ReviewSort::parse(Some("oldest")), ReviewSort::Newest);
        assert!(ReviewSort::Helpful.order_by().starts_with("r.helpful_count DESC"));
    }
}
