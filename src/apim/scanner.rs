//! Service Scanner
//!
//! Orchestrates the fan-out queries for one APIM service instance: load the
//! API catalog once, then walk the Products strictly one at a time, loading
//! each Product's Subscriptions and then its APIs before moving on. Nothing
//! runs concurrently; this keeps at most one page and one Product's lists
//! live and avoids hammering the management plane, at the cost of wall-clock
//! time scaling with the number of round trips.
//!
//! All accumulated state lives in a [`ScanContext`] owned by one
//! `scan_service` call; it is handed to the report builder and then dropped,
//! never shared across instances.

use crate::azure::client::ArmClient;
use crate::azure::resource_id::parse_resource_id;
use crate::apim::report;
use crate::apim::types::{
    ApiContract, ProductContract, ServiceCoords, ServiceResource, SubscriptionContract,
};
use anyhow::Result;
use futures::{pin_mut, TryStreamExt};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Cross-reference state for one service-instance scan
#[derive(Debug, Default)]
pub struct ScanContext {
    /// API name → Products linked to it. Insertion order is the report
    /// order: catalog APIs first, then any API seen only via a Product link.
    pub api_products: IndexMap<String, Vec<ProductContract>>,
    /// Product name → its Subscriptions, written once per Product
    /// (a second write for the same name overwrites, it does not merge)
    pub product_subscriptions: HashMap<String, Vec<SubscriptionContract>>,
    /// Every subscription id seen in this scan; duplicates across Products
    /// collapse, so its size quantifies cross-Product reuse
    pub subscription_ids: HashSet<String>,
}

impl ScanContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// List the instance's APIs and seed the API→Products map with empty entries,
/// so every top-level API shows up in the report even with zero Products
pub async fn load_api_catalog(
    client: &ArmClient,
    coords: &ServiceCoords,
    ctx: &mut ScanContext,
) -> Result<()> {
    println!("querying apis");

    let apis = client.list_as::<ApiContract>(client.service_url(
        &coords.resource_group,
        &coords.service_name,
        "apis",
    ));
    pin_mut!(apis);

    while let Some(api) = apis.try_next().await? {
        ctx.api_products
            .insert(api.name_or_empty().to_string(), Vec::new());
    }

    Ok(())
}

/// List one Product's Subscriptions, record them under the Product's name
/// and merge their ids into the scan-wide id set
pub async fn load_product_subscriptions(
    client: &ArmClient,
    coords: &ServiceCoords,
    product: &ProductContract,
    ctx: &mut ScanContext,
) -> Result<()> {
    println!(
        "querying subscriptions for product {}",
        product.name_or_empty()
    );

    let subscriptions = client.list_as::<SubscriptionContract>(client.product_url(
        &coords.resource_group,
        &coords.service_name,
        product.name_or_empty(),
        "subscriptions",
    ));
    pin_mut!(subscriptions);

    let mut collected = Vec::new();
    while let Some(subscription) = subscriptions.try_next().await? {
        ctx.subscription_ids
            .insert(subscription.id_or_empty().to_string());
        collected.push(subscription);
    }

    ctx.product_subscriptions
        .insert(product.name_or_empty().to_string(), collected);

    Ok(())
}

/// List one Product's APIs and append the Product to each API's product
/// list, creating the entry when the catalog never listed that API (a
/// Product can reference APIs the top-level listing does not surface)
pub async fn link_product_apis(
    client: &ArmClient,
    coords: &ServiceCoords,
    product: &ProductContract,
    ctx: &mut ScanContext,
) -> Result<()> {
    println!("querying apis for {}", product.name_or_empty());

    let apis = client.list_as::<ApiContract>(client.product_url(
        &coords.resource_group,
        &coords.service_name,
        product.name_or_empty(),
        "apis",
    ));
    pin_mut!(apis);

    while let Some(api) = apis.try_next().await? {
        ctx.api_products
            .entry(api.name_or_empty().to_string())
            .or_default()
            .push(product.clone());
    }

    Ok(())
}

/// Run the full scan for one service instance and return the populated
/// cross-reference. Any remote failure aborts the scan; there is no partial
/// result and no retry.
pub async fn scan_service(client: &ArmClient, coords: &ServiceCoords) -> Result<ScanContext> {
    let mut ctx = ScanContext::new();

    load_api_catalog(client, coords, &mut ctx).await?;

    println!("querying products");
    let products = client.list_as::<ProductContract>(client.service_url(
        &coords.resource_group,
        &coords.service_name,
        "products",
    ));
    pin_mut!(products);

    while let Some(product) = products.try_next().await? {
        load_product_subscriptions(client, coords, &product, &mut ctx).await?;
        link_product_apis(client, coords, &product, &mut ctx).await?;
    }

    Ok(ctx)
}

/// Walk every APIM service instance in the subscription, scanning and
/// reporting each one in turn
pub async fn walk_services(client: &ArmClient) -> Result<()> {
    let services = client.list_as::<ServiceResource>(client.service_list_url());
    pin_mut!(services);

    while let Some(service) = services.try_next().await? {
        let id_parts = parse_resource_id(service.id_or_empty());
        let resource_group = id_parts
            .get("resourceGroups")
            .cloned()
            .unwrap_or_default();

        println!(
            "querying apim {} in {}",
            service.name_or_empty(),
            resource_group
        );

        let coords = ServiceCoords {
            resource_group,
            service_name: service.name_or_empty().to_string(),
        };
        let ctx = scan_service(client, &coords).await?;
        report::build_report(&ctx).print();
    }

    Ok(())
}
