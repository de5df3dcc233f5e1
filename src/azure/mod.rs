//! Azure Resource Manager interaction module
//!
//! This module provides the core functionality for talking to the Azure
//! Resource Manager (ARM) REST API, including authentication, the HTTP
//! client, and resource-id parsing.
//!
//! # Module Structure
//!
//! - [`auth`] - Token acquisition via service-principal env vars or the Azure CLI
//! - [`client`] - Main ARM client with paginated listing support
//! - [`http`] - HTTP utilities for REST API calls
//! - [`resource_id`] - ARM resource-id path parsing
//!
//! # Example
//!
//! ```ignore
//! use crate::azure::client::{ArmClient, DEFAULT_ENDPOINT};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = ArmClient::new("my-subscription", DEFAULT_ENDPOINT)?;
//!     let page = client.get(&client.service_list_url()).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
pub mod resource_id;
