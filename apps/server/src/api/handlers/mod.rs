//! Request handlers
//!
//! Handlers parse and validate the request, call one service, and wrap the
//! result in the response envelope.

pub mod catalog;
pub mod customers;
pub mod health;
pub mod installers;
pub mod metrics;
pub mod reviews;
