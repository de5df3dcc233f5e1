//! API Management cross-reference engine
//!
//! Builds, for each APIM service instance, a cross-reference between its
//! APIs, the Products that group them, and the access Subscriptions issued
//! against those Products.
//!
//! # Module Structure
//!
//! - [`types`] - serde models of the ARM APIM resource contracts
//! - [`scanner`] - the per-instance scan: catalog load, Product loop, linking
//! - [`report`] - per-API usage report built from a completed scan
//!
//! # Example
//!
//! ```ignore
//! use crate::apim::{report, scanner};
//! use crate::apim::types::ServiceCoords;
//!
//! async fn example(client: &crate::azure::client::ArmClient) -> anyhow::Result<()> {
//!     let coords = ServiceCoords::new("my-rg", "my-apim");
//!     let ctx = scanner::scan_service(client, &coords).await?;
//!     report::build_report(&ctx).print();
//!     Ok(())
//! }
//! ```

pub mod report;
pub mod scanner;
pub mod types;
