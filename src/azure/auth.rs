//! Azure Authentication
//!
//! Acquires management-plane access tokens either through a service
//! principal (AZURE_TENANT_ID / AZURE_CLIENT_ID / AZURE_CLIENT_SECRET) or,
//! when not configured, by shelling out to the Azure CLI.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// OAuth2 scope for Azure Resource Manager access
pub const ARM_SCOPE: &str = "https://management.azure.com/.default";

/// Resource URI passed to the Azure CLI token request
pub const ARM_RESOURCE: &str = "https://management.azure.com";

/// Microsoft Entra ID token authority
const AUTHORITY: &str = "https://login.microsoftonline.com";

/// Token expiry buffer - refresh tokens this much before they actually expire
/// This prevents using tokens that are about to expire during a request
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Default token TTL if the response carries no expiry (conservative: 30 minutes)
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// ARM credentials holder with token caching
#[derive(Clone)]
pub struct ArmCredentials {
    source: Arc<TokenSource>,
    http: reqwest::Client,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

enum TokenSource {
    /// Client-credentials flow against the Entra ID token endpoint
    ClientSecret {
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
    /// `az account get-access-token` subprocess
    AzureCli,
    /// Fixed token, used by tests against mock servers
    Static(String),
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    /// Check if this cached token is still valid
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

#[derive(Deserialize)]
struct OauthTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliTokenResponse {
    access_token: String,
}

impl ArmCredentials {
    /// Create new ARM credentials from the ambient environment
    ///
    /// Prefers a service principal when all three AZURE_* variables are set,
    /// otherwise falls back to the Azure CLI.
    pub fn new() -> Result<Self> {
        let source = client_secret_from_env().unwrap_or(TokenSource::AzureCli);

        let http = reqwest::Client::builder()
            .user_agent(super::http::USER_AGENT)
            .build()
            .context("Failed to create token HTTP client")?;

        Ok(Self {
            source: Arc::new(source),
            http,
            token_cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Credentials that always return the given token; for tests
    pub fn with_static_token(token: &str) -> Self {
        Self {
            source: Arc::new(TokenSource::Static(token.to_string())),
            http: reqwest::Client::new(),
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Get an access token for ARM calls
    /// Security: Checks token expiry before returning cached token
    pub async fn get_token(&self) -> Result<String> {
        // Check cache first - but only return if token is still valid
        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let (token, ttl) = self.fetch_token().await?;
        let expires_at = Instant::now() + ttl.saturating_sub(TOKEN_EXPIRY_BUFFER);

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token.clone(),
                expires_at,
            });
        }

        tracing::debug!(
            "New token cached, expires in ~{} minutes",
            ttl.saturating_sub(TOKEN_EXPIRY_BUFFER).as_secs() / 60
        );

        Ok(token)
    }

    /// Force refresh the token
    pub async fn refresh_token(&self) -> Result<String> {
        {
            let mut cache = self.token_cache.write().await;
            *cache = None;
        }

        self.get_token().await
    }

    async fn fetch_token(&self) -> Result<(String, Duration)> {
        match self.source.as_ref() {
            TokenSource::Static(token) => Ok((token.clone(), DEFAULT_TOKEN_TTL)),
            TokenSource::ClientSecret {
                tenant_id,
                client_id,
                client_secret,
            } => {
                self.fetch_client_secret_token(tenant_id, client_id, client_secret)
                    .await
            }
            TokenSource::AzureCli => fetch_cli_token().await,
        }
    }

    async fn fetch_client_secret_token(
        &self,
        tenant_id: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<(String, Duration)> {
        let url = format!("{AUTHORITY}/{tenant_id}/oauth2/v2.0/token");
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("scope", ARM_SCOPE),
        ];

        let response = self
            .http
            .post(&url)
            .form(&params)
            .send()
            .await
            .context("Failed to request access token")?;

        let status = response.status();
        if !status.is_success() {
            // Body deliberately not logged: token endpoint errors can echo request material
            return Err(anyhow::anyhow!("Token request failed: {}", status));
        }

        let body: OauthTokenResponse = response
            .json()
            .await
            .context("Failed to parse token response")?;

        let ttl = body
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_TTL);

        Ok((body.access_token, ttl))
    }
}

/// Read service-principal settings from the environment, if complete
fn client_secret_from_env() -> Option<TokenSource> {
    let tenant_id = env_nonempty("AZURE_TENANT_ID")?;
    let client_id = env_nonempty("AZURE_CLIENT_ID")?;
    let client_secret = env_nonempty("AZURE_CLIENT_SECRET")?;
    Some(TokenSource::ClientSecret {
        tenant_id,
        client_id,
        client_secret,
    })
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get a token from the Azure CLI
async fn fetch_cli_token() -> Result<(String, Duration)> {
    let output = tokio::process::Command::new("az")
        .args([
            "account",
            "get-access-token",
            "--resource",
            ARM_RESOURCE,
            "--output",
            "json",
        ])
        .output()
        .await
        .context(
            "Failed to run 'az account get-access-token'. Install the Azure CLI \
             or set AZURE_TENANT_ID/AZURE_CLIENT_ID/AZURE_CLIENT_SECRET",
        )?;

    if !output.status.success() {
        return Err(anyhow::anyhow!(
            "az account get-access-token failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    let parsed: CliTokenResponse = serde_json::from_slice(&output.stdout)
        .context("Failed to parse Azure CLI token output")?;

    // The CLI reports expiry as a local timestamp; a conservative TTL avoids
    // parsing it and still refreshes well before real expiry.
    Ok((parsed.access_token, DEFAULT_TOKEN_TTL))
}
