//! Business logic services

pub mod customers;
pub mod profile;
pub mod reviews;
pub mod search;

pub use customers::{CustomerService, FavoriteAdded};
pub use profile::{ProfileService, ProfileUpdate};
pub use reviews::{ReviewPage, ReviewService};
pub use search::{InstallerPage, SearchService};
