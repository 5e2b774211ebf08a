//! Builder errors
//!
//! - `Lookup`: the inventory could not be reached; wrapped and retryable.
//! - `Secret`: the host secret lookup broke (not "not found"); retryable.
//! - `Rejected`: the inventory answered with a non-OK status for a VM. The
//!   message names the provider, the VM and the status text verbatim.

use crate::secret::SecretLookupError;
use crds::ProviderType;
use inventory_client::{InventoryError, StatusCode};
use thiserror::Error;

/// Errors raised by provider builders
#[derive(Debug, Error)]
pub enum BuilderError {
    /// Inventory request failed
    #[error("{provider}: inventory lookup for VM {vm_id} failed: {source}")]
    Lookup {
        /// Provider type
        provider: ProviderType,
        /// VM ID
        vm_id: String,
        /// Underlying inventory error
        #[source]
        source: InventoryError,
    },

    /// Inventory rejected the query
    #[error("{provider}: VM {vm_id} lookup failed: {reason}")]
    Rejected {
        /// Provider type
        provider: ProviderType,
        /// VM ID
        vm_id: String,
        /// HTTP status returned by the inventory
        status: StatusCode,
        /// Status text (e.g. "Not Found")
        reason: String,
    },

    /// Host secret lookup failed
    #[error("{provider}: secret {namespace}/{name} for host {host_id} lookup failed: {source}")]
    Secret {
        /// Provider type
        provider: ProviderType,
        /// Host ID
        host_id: String,
        /// Secret namespace
        namespace: String,
        /// Secret name
        name: String,
        /// Underlying lookup error
        #[source]
        source: SecretLookupError,
    },

    /// Credential payload could not be encoded
    #[error("{provider}: failed to encode credentials: {source}")]
    Encode {
        /// Provider type
        provider: ProviderType,
        /// Underlying encoding error
        #[source]
        source: serde_yaml::Error,
    },

    /// Provider resource cannot be used to build a client
    #[error("invalid provider {0}")]
    InvalidProvider(String),

    /// No builder registered for the provider type
    #[error("no builder registered for provider type {0}")]
    UnsupportedProvider(ProviderType),

    /// Inventory client could not be created
    #[error("failed to create inventory client: {0}")]
    Client(#[source] InventoryError),
}

impl BuilderError {
    /// Build a remote rejection error for a VM.
    pub fn rejected(provider: ProviderType, vm_id: &str, status: StatusCode) -> Self {
        let reason = status
            .canonical_reason()
            .map_or_else(|| status.as_str().to_string(), str::to_string);
        Self::Rejected {
            provider,
            vm_id: vm_id.to_string(),
            status,
            reason,
        }
    }

    /// Whether retrying the same call later may succeed.
    ///
    /// Remote rejections are not retried by the builder; the caller decides.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Lookup { .. } | Self::Secret { .. } | Self::Client(_))
    }
}
