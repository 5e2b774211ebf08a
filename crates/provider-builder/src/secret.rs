//! Secret lookup
//!
//! Builders read host credential Secrets through [`SecretLookup`]. A missing
//! Secret is `Ok(None)`; any other failure is an error.

use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use thiserror::Error;

/// Secret lookup failure (anything but "not found")
#[derive(Debug, Error)]
pub enum SecretLookupError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Error from a non-Kubernetes secret backend
    #[error("secret backend error: {0}")]
    Backend(String),
}

/// Read access to Secrets
#[async_trait::async_trait]
pub trait SecretLookup: Send + Sync {
    /// Get a Secret by namespace and name; `None` when it does not exist.
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>, SecretLookupError>;
}

/// Secret lookup backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeSecretLookup {
    client: Client,
}

impl std::fmt::Debug for KubeSecretLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeSecretLookup").finish_non_exhaustive()
    }
}

impl KubeSecretLookup {
    /// Creates a new lookup using the given client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl SecretLookup for KubeSecretLookup {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>, SecretLookupError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get_opt(name).await?)
    }
}

#[cfg(any(test, feature = "test-util"))]
pub use memory::MemorySecretLookup;

#[cfg(any(test, feature = "test-util"))]
mod memory {
    use super::{SecretLookup, SecretLookupError};
    use k8s_openapi::api::core::v1::Secret;
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex, PoisonError};

    /// In-memory secret lookup for tests
    #[derive(Debug, Clone, Default)]
    pub struct MemorySecretLookup {
        secrets: Arc<Mutex<HashMap<(String, String), Secret>>>,
        broken: Arc<Mutex<HashSet<(String, String)>>>,
    }

    impl MemorySecretLookup {
        /// Create an empty lookup
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a secret (for test setup)
        pub fn add(&self, namespace: &str, name: &str, secret: Secret) {
            self.secrets
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert((namespace.to_string(), name.to_string()), secret);
        }

        /// Make lookups of a secret fail (for test setup)
        pub fn break_secret(&self, namespace: &str, name: &str) {
            self.broken
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert((namespace.to_string(), name.to_string()));
        }
    }

    #[async_trait::async_trait]
    impl SecretLookup for MemorySecretLookup {
        async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>, SecretLookupError> {
            let key = (namespace.to_string(), name.to_string());
            if self
                .broken
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .contains(&key)
            {
                return Err(SecretLookupError::Backend(format!(
                    "connection refused reading {namespace}/{name}"
                )));
            }
            Ok(self
                .secrets
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(&key)
                .cloned())
        }
    }
}
