//! Inventory API client
//!
//! Implements the inventory REST API client. Every call is a single bounded
//! request/response; nothing is cached.

use crate::error::InventoryError;
use crate::inventory_trait::{InventoryClientTrait, Reply};
use reqwest::{Client, StatusCode, Url};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Identifies a provider's subtree in the inventory API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPath {
    provider_type: String,
    uid: String,
}

impl ProviderPath {
    /// Create a provider path from the provider type tag and provider UID
    pub fn new(provider_type: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            provider_type: provider_type.into(),
            uid: uid.into(),
        }
    }
}

impl fmt::Display for ProviderPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/providers/{}/{}", self.provider_type, self.uid)
    }
}

/// Inventory API client scoped to one provider
pub struct InventoryClient {
    client: Client,
    base_url: String,
    provider: ProviderPath,
    token: Option<String>,
}

impl fmt::Debug for InventoryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InventoryClient")
            .field("base_url", &self.base_url)
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

impl InventoryClient {
    /// Create a new inventory client with the default timeout
    ///
    /// # Arguments
    /// * `base_url` - Inventory base URL (e.g., "http://inventory:8080")
    /// * `provider` - Provider subtree to query
    /// * `token` - Optional bearer token
    pub fn new(
        base_url: String,
        provider: ProviderPath,
        token: Option<String>,
    ) -> Result<Self, InventoryError> {
        Self::with_config(base_url, provider, token, DEFAULT_TIMEOUT, true)
    }

    /// Create a new inventory client with an explicit timeout and TLS policy
    pub fn with_config(
        base_url: String,
        provider: ProviderPath,
        token: Option<String>,
        timeout: Duration,
        verify_tls: bool,
    ) -> Result<Self, InventoryError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| InventoryError::InvalidUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(!verify_tls)
            .build()?;

        Ok(Self {
            client,
            base_url,
            provider,
            token,
        })
    }

    /// Build a full URL from a path relative to the provider root
    pub fn build_url(&self, path: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            self.provider,
            path.trim_start_matches('/')
        )
    }

    /// Parse the URL for `path`, `None` unless it names a resource below the
    /// provider root exactly as given (no dot segments, query or fragment).
    fn scoped_url(&self, path: &str) -> Option<Url> {
        let relative = path.trim_start_matches('/');
        if relative.is_empty() || relative.ends_with('/') {
            return None;
        }
        let root = Url::parse(&self.build_url("")).ok()?;
        let url = Url::parse(&self.build_url(path)).ok()?;
        let in_scope = url.query().is_none()
            && url.fragment().is_none()
            && url.path().strip_prefix(root.path()) == Some(relative);
        in_scope.then_some(url)
    }
}

#[async_trait::async_trait]
impl InventoryClientTrait for InventoryClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: &str) -> Result<Reply, InventoryError> {
        let Some(url) = self.scoped_url(path) else {
            warn!("Inventory path {:?} is outside {}, not sent", path, self.provider);
            return Ok(Reply {
                status: StatusCode::BAD_REQUEST,
                body: None,
            });
        };
        debug!("GET {}", url);

        let mut request = self.client.get(url.clone()).header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;

        let status = response.status();
        let text = response.text().await?;
        let body = if text.is_empty() {
            None
        } else if status == StatusCode::OK {
            let value = serde_json::from_str(&text).map_err(|source| InventoryError::Decode {
                path: path.to_string(),
                source,
            })?;
            Some(value)
        } else {
            debug!("GET {} returned {}", url, status);
            serde_json::from_str(&text).ok()
        };

        Ok(Reply { status, body })
    }
}
