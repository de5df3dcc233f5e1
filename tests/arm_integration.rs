//! Integration tests for the APIM scan against a mocked ARM endpoint
//!
//! These tests drive the full cross-reference pipeline over wiremock,
//! covering pagination via nextLink, lazy page consumption, error
//! propagation and the report shape.

use apim_usage::apim::report::{build_report, ApiUsage};
use apim_usage::apim::scanner::{scan_service, walk_services};
use apim_usage::apim::types::ServiceCoords;
use apim_usage::azure::auth::ArmCredentials;
use apim_usage::azure::client::ArmClient;
use futures::{pin_mut, TryStreamExt};
use serde_json::json;
use wiremock::matchers::{bearer_token, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SUBSCRIPTION: &str = "test-sub";
const TOKEN: &str = "test-token";

fn test_client(server: &MockServer) -> ArmClient {
    ArmClient::with_credentials(
        ArmCredentials::with_static_token(TOKEN),
        SUBSCRIPTION,
        &server.uri(),
    )
    .expect("client should build against mock endpoint")
}

fn service_path(suffix: &str) -> String {
    format!(
        "/subscriptions/{}/resourceGroups/rg-1/providers/Microsoft.ApiManagement/service/apim-1/{}",
        SUBSCRIPTION, suffix
    )
}

async fn mount_list(server: &MockServer, path_str: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(path_str))
        .and(query_param("api-version", "2022-08-01"))
        .and(bearer_token(TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// The reference scenario: two APIs, two Products, three Subscriptions
#[tokio::test]
async fn end_to_end_cross_reference() {
    let server = MockServer::start().await;

    mount_list(
        &server,
        &service_path("apis"),
        json!({ "value": [{ "name": "a1" }, { "name": "a2" }] }),
    )
    .await;
    mount_list(
        &server,
        &service_path("products"),
        json!({ "value": [{ "name": "p1" }, { "name": "p2" }] }),
    )
    .await;
    mount_list(
        &server,
        &service_path("products/p1/subscriptions"),
        json!({ "value": [{ "id": "s1" }] }),
    )
    .await;
    mount_list(
        &server,
        &service_path("products/p1/apis"),
        json!({ "value": [{ "name": "a1" }] }),
    )
    .await;
    mount_list(
        &server,
        &service_path("products/p2/subscriptions"),
        json!({ "value": [{ "id": "s2" }, { "id": "s3" }] }),
    )
    .await;
    mount_list(
        &server,
        &service_path("products/p2/apis"),
        json!({ "value": [{ "name": "a1" }, { "name": "a2" }] }),
    )
    .await;

    let client = test_client(&server);
    let coords = ServiceCoords::new("rg-1", "apim-1");
    let ctx = scan_service(&client, &coords).await.expect("scan succeeds");

    assert_eq!(ctx.subscription_ids.len(), 3);
    assert!(ctx.subscription_ids.contains("s1"));
    assert!(ctx.subscription_ids.contains("s2"));
    assert!(ctx.subscription_ids.contains("s3"));

    let report = build_report(&ctx);
    assert_eq!(
        report.lines,
        vec![
            ApiUsage {
                api: "a1".to_string(),
                product_count: 2,
                subscription_count: 3
            },
            ApiUsage {
                api: "a2".to_string(),
                product_count: 1,
                subscription_count: 2
            },
        ]
    );
    assert_eq!(
        report.lines[0].format(),
        "API a1 Products = 2, Subscriptions = 3"
    );
    assert_eq!(
        report.lines[1].format(),
        "API a2 Products = 1, Subscriptions = 2"
    );
}

/// APIs with zero Products still appear, with zero counts
#[tokio::test]
async fn apis_without_products_report_zeroes() {
    let server = MockServer::start().await;

    mount_list(
        &server,
        &service_path("apis"),
        json!({ "value": [{ "name": "a1" }, { "name": "a2" }] }),
    )
    .await;
    mount_list(&server, &service_path("products"), json!({ "value": [] })).await;

    let client = test_client(&server);
    let ctx = scan_service(&client, &ServiceCoords::new("rg-1", "apim-1"))
        .await
        .expect("scan succeeds");

    let report = build_report(&ctx);
    assert_eq!(report.lines.len(), 2);
    for line in &report.lines {
        assert_eq!(line.product_count, 0);
        assert_eq!(line.subscription_count, 0);
    }
    assert_eq!(report.total_subscriptions, 0);
}

/// Two unnamed APIs collapse into one empty-string entry. Intentional but
/// risky: distinct unnamed resources silently merge.
#[tokio::test]
async fn unnamed_apis_collapse_into_one_entry() {
    let server = MockServer::start().await;

    mount_list(
        &server,
        &service_path("apis"),
        json!({ "value": [{ "id": "first" }, { "id": "second" }] }),
    )
    .await;
    mount_list(&server, &service_path("products"), json!({ "value": [] })).await;

    let client = test_client(&server);
    let ctx = scan_service(&client, &ServiceCoords::new("rg-1", "apim-1"))
        .await
        .expect("scan succeeds");

    assert_eq!(ctx.api_products.len(), 1);
    assert!(ctx.api_products.contains_key(""));
}

/// A Product linking an API the catalog never listed creates the entry
#[tokio::test]
async fn product_link_creates_missing_api_entry() {
    let server = MockServer::start().await;

    mount_list(
        &server,
        &service_path("apis"),
        json!({ "value": [{ "name": "a1" }] }),
    )
    .await;
    mount_list(
        &server,
        &service_path("products"),
        json!({ "value": [{ "name": "p1" }] }),
    )
    .await;
    mount_list(
        &server,
        &service_path("products/p1/subscriptions"),
        json!({ "value": [{ "id": "s1" }] }),
    )
    .await;
    mount_list(
        &server,
        &service_path("products/p1/apis"),
        json!({ "value": [{ "name": "hidden" }] }),
    )
    .await;

    let client = test_client(&server);
    let ctx = scan_service(&client, &ServiceCoords::new("rg-1", "apim-1"))
        .await
        .expect("scan succeeds");

    let report = build_report(&ctx);
    let order: Vec<&str> = report.lines.iter().map(|l| l.api.as_str()).collect();
    assert_eq!(order, ["a1", "hidden"]);
    assert_eq!(report.lines[1].product_count, 1);
    assert_eq!(report.lines[1].subscription_count, 1);
}

/// The same subscription id under two Products collapses in the global set
#[tokio::test]
async fn duplicate_subscription_ids_collapse_in_global_set() {
    let server = MockServer::start().await;

    mount_list(&server, &service_path("apis"), json!({ "value": [] })).await;
    mount_list(
        &server,
        &service_path("products"),
        json!({ "value": [{ "name": "p1" }, { "name": "p2" }] }),
    )
    .await;
    mount_list(
        &server,
        &service_path("products/p1/subscriptions"),
        json!({ "value": [{ "id": "shared" }] }),
    )
    .await;
    mount_list(&server, &service_path("products/p1/apis"), json!({ "value": [] })).await;
    mount_list(
        &server,
        &service_path("products/p2/subscriptions"),
        json!({ "value": [{ "id": "shared" }, { "id": "own" }] }),
    )
    .await;
    mount_list(&server, &service_path("products/p2/apis"), json!({ "value": [] })).await;

    let client = test_client(&server);
    let ctx = scan_service(&client, &ServiceCoords::new("rg-1", "apim-1"))
        .await
        .expect("scan succeeds");

    let recorded_total: usize = ctx.product_subscriptions.values().map(Vec::len).sum();
    assert_eq!(recorded_total, 3);
    assert_eq!(ctx.subscription_ids.len(), 2);
}

/// Listing follows nextLink across pages
#[tokio::test]
async fn pagination_follows_next_link() {
    let server = MockServer::start().await;

    mount_list(
        &server,
        &service_path("apis"),
        json!({
            "value": [{ "name": "a1" }, { "name": "a2" }],
            "nextLink": format!("{}/page2", server.uri())
        }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/page2"))
        .and(bearer_token(TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{ "name": "a3" }]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let names: Vec<String> = client
        .list_paged(client.service_url("rg-1", "apim-1", "apis"))
        .map_ok(|record| record["name"].as_str().unwrap_or("").to_string())
        .try_collect()
        .await
        .expect("listing succeeds");

    assert_eq!(names, ["a1", "a2", "a3"]);
}

/// Pages beyond what is consumed are never fetched
#[tokio::test]
async fn unconsumed_pages_are_not_fetched() {
    let server = MockServer::start().await;

    mount_list(
        &server,
        &service_path("apis"),
        json!({
            "value": [{ "name": "a1" }, { "name": "a2" }],
            "nextLink": format!("{}/page2", server.uri())
        }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server);
    {
        let records = client.list_paged(client.service_url("rg-1", "apim-1", "apis"));
        pin_mut!(records);

        // Consume only the first page's records; the stream is dropped before
        // it would suspend on the second page fetch.
        assert!(records.try_next().await.expect("record").is_some());
        assert!(records.try_next().await.expect("record").is_some());
    }

    server.verify().await;
}

/// A remote failure aborts the scan with no partial result
#[tokio::test]
async fn remote_failure_propagates() {
    let server = MockServer::start().await;

    mount_list(
        &server,
        &service_path("apis"),
        json!({ "value": [{ "name": "a1" }] }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(service_path("products")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "code": "InternalServerError", "message": "boom" }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = scan_service(&client, &ServiceCoords::new("rg-1", "apim-1")).await;

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("500"));
}

/// Directory walk extracts the resource group from the service's ARM id
#[tokio::test]
async fn walk_services_scans_each_instance() {
    let server = MockServer::start().await;

    mount_list(
        &server,
        &format!(
            "/subscriptions/{}/providers/Microsoft.ApiManagement/service",
            SUBSCRIPTION
        ),
        json!({
            "value": [{
                "id": format!(
                    "/subscriptions/{}/resourceGroups/rg-1/providers/Microsoft.ApiManagement/service/apim-1",
                    SUBSCRIPTION
                ),
                "name": "apim-1",
                "location": "westeurope"
            }]
        }),
    )
    .await;
    // These mocks only match when the walker derived rg-1/apim-1 correctly
    mount_list(
        &server,
        &service_path("apis"),
        json!({ "value": [{ "name": "a1" }] }),
    )
    .await;
    mount_list(&server, &service_path("products"), json!({ "value": [] })).await;

    let client = test_client(&server);
    walk_services(&client).await.expect("walk succeeds");
}
