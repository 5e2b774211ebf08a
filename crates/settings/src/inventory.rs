//! Inventory settings

use crate::env::{get_env_bool, get_env_limit, get_env_string};
use crate::error::SettingsError;
use std::fmt;
use std::time::Duration;

/// Inventory base URL variable
pub const INVENTORY_URL: &str = "INVENTORY_URL";
/// Inventory request timeout (seconds) variable
pub const INVENTORY_TIMEOUT: &str = "INVENTORY_TIMEOUT";
/// Inventory TLS verification variable
pub const INVENTORY_TLS_VERIFY: &str = "INVENTORY_TLS_VERIFY";
/// Inventory bearer token variable
pub const INVENTORY_TOKEN: &str = "INVENTORY_TOKEN";

/// How the controllers reach the inventory service
#[derive(Clone, PartialEq, Eq)]
pub struct InventorySettings {
    /// Base URL
    pub url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Verify the inventory TLS certificate
    pub tls_verify: bool,
    /// Optional bearer token
    pub token: Option<String>,
}

impl fmt::Debug for InventorySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InventorySettings")
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .field("tls_verify", &self.tls_verify)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(30),
            tls_verify: true,
            token: None,
        }
    }
}

impl InventorySettings {
    pub(crate) fn load<F>(lookup: &F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let timeout = get_env_limit(lookup, INVENTORY_TIMEOUT, 30)?;
        Ok(Self {
            url: get_env_string(lookup, INVENTORY_URL, &defaults.url),
            timeout: Duration::from_secs(u64::try_from(timeout).unwrap_or(u64::MAX)),
            tls_verify: get_env_bool(lookup, INVENTORY_TLS_VERIFY, defaults.tls_verify),
            token: lookup(INVENTORY_TOKEN).filter(|t| !t.is_empty()),
        })
    }
}
