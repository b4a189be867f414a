//! Installer marketplace API
//!
//! Backend for a home-repair marketplace that connects customers with
//! installers:
//! - Installer search with filters, ranking and pagination
//! - Atomic installer profile updates (attributes, offerings, service areas)
//! - Customer reviews with per-installer rating aggregates
//! - Service category and location reference data

#![allow(
    clippy::too_many_arguments,      // Axum handlers take one argument per extractor
    clippy::type_complexity,         // Layer and subscriber types are verbose by nature
)]

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod request_context;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;
