//! ARM Client
//!
//! Main client for the Azure Resource Manager REST API, combining
//! authentication, the HTTP layer and paginated listing.

use super::auth::ArmCredentials;
use super::http::ArmHttpClient;
use anyhow::{Context, Result};
use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

/// Public Azure management endpoint
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

/// api-version for Microsoft.ApiManagement resources
pub const APIM_API_VERSION: &str = "2022-08-01";

/// Main ARM client
#[derive(Clone)]
pub struct ArmClient {
    pub credentials: ArmCredentials,
    pub http: ArmHttpClient,
    pub subscription_id: String,
    endpoint: String,
}

impl ArmClient {
    /// Create a new ARM client with credentials from the ambient environment
    pub fn new(subscription_id: &str, endpoint: &str) -> Result<Self> {
        let credentials = ArmCredentials::new()
            .context("Failed to initialize Azure credentials")?;
        Self::with_credentials(credentials, subscription_id, endpoint)
    }

    /// Create an ARM client with explicit credentials (tests use this with a
    /// static token and a mock endpoint)
    pub fn with_credentials(
        credentials: ArmCredentials,
        subscription_id: &str,
        endpoint: &str,
    ) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .context("Invalid management endpoint URL")?;

        Ok(Self {
            credentials,
            http: ArmHttpClient::new()?,
            subscription_id: subscription_id.to_string(),
            endpoint: endpoint.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Get the current access token
    pub async fn get_token(&self) -> Result<String> {
        self.credentials.get_token().await
    }

    /// Make a GET request to an ARM endpoint
    pub async fn get(&self, url: &str) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.get(url, &token).await
    }

    // =========================================================================
    // API Management URL helpers
    // =========================================================================

    /// Build the subscription-wide APIM service listing URL
    pub fn service_list_url(&self) -> String {
        format!(
            "{}/subscriptions/{}/providers/Microsoft.ApiManagement/service?api-version={}",
            self.endpoint, self.subscription_id, APIM_API_VERSION
        )
    }

    /// Build a URL for a collection under one APIM service instance
    pub fn service_url(&self, resource_group: &str, service_name: &str, resource: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.ApiManagement/service/{}/{}?api-version={}",
            self.endpoint,
            self.subscription_id,
            resource_group,
            service_name,
            resource,
            APIM_API_VERSION
        )
    }

    /// Build a URL for a collection under one Product
    pub fn product_url(
        &self,
        resource_group: &str,
        service_name: &str,
        product_name: &str,
        resource: &str,
    ) -> String {
        self.service_url(
            resource_group,
            service_name,
            &format!("products/{}/{}", urlencoding::encode(product_name), resource),
        )
    }

    // =========================================================================
    // Paginated listing
    // =========================================================================

    /// List an ARM collection as a lazy stream of raw records.
    ///
    /// ARM list responses carry a `value` array and, when more pages exist, a
    /// `nextLink` URL. Each page is fetched only when consumption reaches it;
    /// the stream is finite and cannot be restarted. Any transport or API
    /// error ends the stream with that error.
    pub fn list_paged(&self, first_url: String) -> impl Stream<Item = Result<Value>> + '_ {
        stream::try_unfold(Some(first_url), move |state| async move {
            let Some(url) = state else {
                return Ok::<_, anyhow::Error>(None);
            };

            let page = self.get(&url).await?;
            let records: Vec<Value> = page
                .get("value")
                .and_then(|v| v.as_array())
                .cloned()
                .unwrap_or_default();
            let next_link = page
                .get("nextLink")
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string());

            tracing::debug!(
                "fetched page with {} records, more = {}",
                records.len(),
                next_link.is_some()
            );

            Ok(Some((
                stream::iter(records.into_iter().map(Ok::<Value, anyhow::Error>)),
                next_link,
            )))
        })
        .try_flatten()
    }

    /// List an ARM collection as typed records
    pub fn list_as<T>(&self, first_url: String) -> impl Stream<Item = Result<T>> + '_
    where
        T: DeserializeOwned,
    {
        self.list_paged(first_url).map(|record| {
            record.and_then(|value| {
                serde_json::from_value(value).context("Failed to deserialize ARM record")
            })
        })
    }
}

/// Format an ARM API error for display
pub fn format_arm_error(error: &anyhow::Error) -> String {
    super::http::format_arm_error(error)
}
