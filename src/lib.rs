//! apim-usage
//!
//! Read-only reporting over Azure API Management: for every APIM service
//! instance in a subscription, cross-references its APIs, Products and
//! Subscriptions and reports per-API usage counts.

pub mod apim;
pub mod azure;
pub mod config;
