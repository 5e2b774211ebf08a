//! Builder contract and registry
//!
//! The reconciler and plan execution layer pick a builder through the
//! [`Registry`] by provider type. They never match on concrete builder types.

use crate::error::BuilderError;
use crate::host::{HostMap, HostResolution};
use crate::secret::SecretLookup;
use crds::{ImportSourceSpec, Map, Provider, ProviderType, ResourceMapping, Task};
use inventory_client::{InventoryClient, InventoryClientTrait, ProviderPath};
use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use settings::InventorySettings;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Capability set every provider builder implements.
///
/// All operations are keyed by the VM's inventory ID, hold no state between
/// calls, and fully repopulate the output objects they are given.
#[async_trait::async_trait]
pub trait Builder: Send + Sync {
    /// Provider type served by this builder
    fn provider_type(&self) -> ProviderType;

    /// Build the credential Secret payload for a VM.
    ///
    /// When the VM's host has a Host resource whose Secret exists, that Secret
    /// replaces `fallback` entirely. A missing Host or Secret falls back.
    async fn secret(&self, vm_id: &str, fallback: &Secret, object: &mut Secret) -> Result<(), BuilderError>;

    /// Build the resource mapping from the plan map, one entry per input entry, in order.
    fn mapping(&self, map: &Map, object: &mut ResourceMapping) -> Result<(), BuilderError>;

    /// Build the import source descriptor for a VM.
    async fn source(&self, vm_id: &str, object: &mut ImportSourceSpec) -> Result<(), BuilderError>;

    /// Build the ordered task list for a VM, one task per disk.
    async fn tasks(&self, vm_id: &str) -> Result<Vec<Task>, BuilderError>;

    /// Resolve the host a VM runs on.
    async fn resolve_host(&self, vm_id: &str) -> Result<HostResolution, BuilderError>;
}

/// Everything a builder needs for the duration of its use
#[derive(Clone)]
pub struct BuilderContext {
    /// Source provider
    pub provider: Arc<Provider>,
    /// Inventory client scoped to the provider
    pub inventory: Arc<dyn InventoryClientTrait>,
    /// Secret access
    pub secrets: Arc<dyn SecretLookup>,
    /// Host map snapshot for the provider
    pub hosts: Arc<HostMap>,
}

impl fmt::Debug for BuilderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuilderContext")
            .field("provider", &self.provider.name_any())
            .field("inventory", &self.inventory.base_url())
            .field("hosts", &self.hosts.len())
            .finish_non_exhaustive()
    }
}

impl BuilderContext {
    /// Creates a context from already-built collaborators.
    pub fn new(
        provider: Arc<Provider>,
        inventory: Arc<dyn InventoryClientTrait>,
        secrets: Arc<dyn SecretLookup>,
        hosts: Arc<HostMap>,
    ) -> Self {
        Self {
            provider,
            inventory,
            secrets,
            hosts,
        }
    }

    /// Creates a context with an inventory client obtained from `connector`.
    pub fn connect(
        provider: Arc<Provider>,
        connector: &dyn InventoryConnector,
        secrets: Arc<dyn SecretLookup>,
        hosts: Arc<HostMap>,
    ) -> Result<Self, BuilderError> {
        let inventory = connector.connect(&provider)?;
        Ok(Self::new(provider, inventory, secrets, hosts))
    }
}

/// Creates inventory clients scoped to a provider
pub trait InventoryConnector: Send + Sync {
    /// Inventory client for the provider.
    fn connect(&self, provider: &Provider) -> Result<Arc<dyn InventoryClientTrait>, BuilderError>;
}

impl InventoryConnector for InventorySettings {
    fn connect(&self, provider: &Provider) -> Result<Arc<dyn InventoryClientTrait>, BuilderError> {
        let uid = provider
            .uid()
            .ok_or_else(|| BuilderError::InvalidProvider(format!("{} has no UID", provider.name_any())))?;
        let client = InventoryClient::with_config(
            self.url.clone(),
            ProviderPath::new(provider.spec.r#type.as_str(), uid),
            self.token.clone(),
            self.timeout,
            self.tls_verify,
        )
        .map_err(BuilderError::Client)?;
        Ok(Arc::new(client))
    }
}

/// Every provider shares the mock's replies.
#[cfg(any(test, feature = "test-util"))]
impl InventoryConnector for inventory_client::MockInventoryClient {
    fn connect(&self, _provider: &Provider) -> Result<Arc<dyn InventoryClientTrait>, BuilderError> {
        Ok(Arc::new(self.clone()))
    }
}

/// Constructs a builder for a context
pub type BuilderFactory = fn(BuilderContext) -> Box<dyn Builder>;

/// Builders keyed by provider type
#[derive(Clone)]
pub struct Registry {
    factories: HashMap<ProviderType, BuilderFactory>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("providers", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for Registry {
    /// Registry with every built-in provider.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(ProviderType::Vsphere, crate::vsphere::Builder::boxed);
        registry
    }
}

impl Registry {
    /// Registry with no providers.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register (or replace) the factory for a provider type.
    pub fn register(&mut self, provider_type: ProviderType, factory: BuilderFactory) {
        self.factories.insert(provider_type, factory);
    }

    /// Whether a builder is registered for the provider type.
    pub fn supports(&self, provider_type: ProviderType) -> bool {
        self.factories.contains_key(&provider_type)
    }

    /// Create the builder for the context's provider.
    pub fn builder(&self, ctx: BuilderContext) -> Result<Box<dyn Builder>, BuilderError> {
        let provider_type = ctx.provider.spec.r#type;
        let factory = self
            .factories
            .get(&provider_type)
            .ok_or(BuilderError::UnsupportedProvider(provider_type))?;
        Ok(factory(ctx))
    }
}
