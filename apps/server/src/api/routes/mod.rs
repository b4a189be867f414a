//! Route tables

pub mod marketplace;
pub mod metrics;
