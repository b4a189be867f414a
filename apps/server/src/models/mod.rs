//! Domain models for the marketplace

pub mod catalog;
pub mod customer;
pub mod installer;
pub mod review;

pub use catalog::{CategoryNode, City, Region, ServiceCategory};
pub use customer::{Favorite, FavoriteInstaller, NewFavorite, NewSearchHistory, SearchHistoryEntry};
pub use installer::{
    InstallerDetail, InstallerDetailRow, InstallerRow, InstallerService, InstallerSummary,
    ProfileFields, ProfilePatch, ProfileRecord, ServiceArea,
};
pub use review::{
    CreatedReview, CustomerReview, NewReview, RatingStats, Review, ReviewOwner, ReviewPatch, UpdatedReview,
};
