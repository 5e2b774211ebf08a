//! Object store access.
//!
//! The reconciler reads Migrations and the resources they reference, and
//! writes Migration status, through [`MigrationStore`]. [`KubeStore`] is the
//! Kubernetes implementation.

use crds::{Host, Migration, MigrationStatus, Plan, Provider};
use kube::api::{ListParams, Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Namespace and name of a namespaced resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    /// Namespace
    pub namespace: String,
    /// Name
    pub name: String,
}

impl ResourceKey {
    /// Create a key
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Key of an existing resource
    pub fn of<K: ResourceExt>(resource: &K) -> Self {
        Self::new(resource.namespace().unwrap_or_default(), resource.name_any())
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Object store errors
///
/// Every variant is transient from the reconciler's point of view.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Optimistic concurrency failure: the resource changed since it was read
    #[error("conflict updating {0}: resource was modified")]
    Conflict(ResourceKey),

    /// Any other Kubernetes API failure
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Error from a non-Kubernetes store
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether the error is an optimistic concurrency conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Read/write access to the resources the reconciler works with
#[async_trait::async_trait]
pub trait MigrationStore: Send + Sync {
    /// Get a Migration; `None` when it does not exist.
    async fn get_migration(&self, key: &ResourceKey) -> Result<Option<Migration>, StoreError>;

    /// Get a Plan; `None` when it does not exist.
    async fn get_plan(&self, key: &ResourceKey) -> Result<Option<Plan>, StoreError>;

    /// Get a Provider; `None` when it does not exist.
    async fn get_provider(&self, key: &ResourceKey) -> Result<Option<Provider>, StoreError>;

    /// List the Host resources visible to the controller.
    async fn list_hosts(&self) -> Result<Vec<Host>, StoreError>;

    /// Replace the status of `migration`.
    ///
    /// The write is conditional on the resource version `migration` was read
    /// at; a concurrent modification yields [`StoreError::Conflict`].
    async fn update_status(&self, migration: &Migration, status: &MigrationStatus) -> Result<(), StoreError>;
}

/// Kubernetes-backed store
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
    namespace: Option<String>,
}

impl fmt::Debug for KubeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubeStore")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl KubeStore {
    /// Creates a store. Hosts are listed in `namespace`, or in all namespaces when `None`.
    pub fn new(client: Client, namespace: Option<String>) -> Self {
        Self { client, namespace }
    }
}

#[async_trait::async_trait]
impl MigrationStore for KubeStore {
    async fn get_migration(&self, key: &ResourceKey) -> Result<Option<Migration>, StoreError> {
        let api: Api<Migration> = Api::namespaced(self.client.clone(), &key.namespace);
        Ok(api.get_opt(&key.name).await?)
    }

    async fn get_plan(&self, key: &ResourceKey) -> Result<Option<Plan>, StoreError> {
        let api: Api<Plan> = Api::namespaced(self.client.clone(), &key.namespace);
        Ok(api.get_opt(&key.name).await?)
    }

    async fn get_provider(&self, key: &ResourceKey) -> Result<Option<Provider>, StoreError> {
        let api: Api<Provider> = Api::namespaced(self.client.clone(), &key.namespace);
        Ok(api.get_opt(&key.name).await?)
    }

    async fn list_hosts(&self) -> Result<Vec<Host>, StoreError> {
        let api: Api<Host> = match &self.namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        };
        Ok(api.list(&ListParams::default()).await?.items)
    }

    async fn update_status(&self, migration: &Migration, status: &MigrationStatus) -> Result<(), StoreError> {
        let key = ResourceKey::of(migration);
        let api: Api<Migration> = Api::namespaced(self.client.clone(), &key.namespace);

        // resourceVersion turns the merge patch into a conditional update
        let patch = serde_json::json!({
            "metadata": { "resourceVersion": migration.resource_version() },
            "status": status,
        });

        match api
            .patch_status(&key.name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
        {
            Ok(_) => {
                debug!("Updated status of Migration {}", key);
                Ok(())
            }
            Err(kube::Error::Api(e)) if e.code == 409 => Err(StoreError::Conflict(key)),
            Err(e) => Err(StoreError::Kube(e)),
        }
    }
}
