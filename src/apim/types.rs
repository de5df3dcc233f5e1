//! ARM resource contracts for Microsoft.ApiManagement
//!
//! Only the fields the scan reads are modeled; everything else the API
//! returns is ignored. `name` and `id` are optional on the wire and are
//! coalesced to an empty string at map boundaries, so two unnamed resources
//! of the same kind share one map entry.

use serde::Deserialize;

/// Coordinates of one APIM service instance within the subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCoords {
    pub resource_group: String,
    pub service_name: String,
}

impl ServiceCoords {
    pub fn new(resource_group: &str, service_name: &str) -> Self {
        Self {
            resource_group: resource_group.to_string(),
            service_name: service_name.to_string(),
        }
    }
}

/// An APIM service instance as listed subscription-wide
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceResource {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl ServiceResource {
    pub fn id_or_empty(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }

    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// An API exposed by a service instance
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiContract {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub properties: ApiProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiProperties {
    pub display_name: Option<String>,
    pub path: Option<String>,
}

impl ApiContract {
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// A Product grouping APIs under a shared access policy
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductContract {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub properties: ProductProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductProperties {
    pub display_name: Option<String>,
    pub state: Option<String>,
    pub subscription_required: Option<bool>,
}

impl ProductContract {
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// A Subscription granting access to a Product's APIs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionContract {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub properties: SubscriptionProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionProperties {
    pub display_name: Option<String>,
    pub state: Option<String>,
    pub scope: Option<String>,
}

impl SubscriptionContract {
    pub fn id_or_empty(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }
}
