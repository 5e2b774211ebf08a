//! Reference resolution.
//!
//! Loads everything a Migration points at so validation can run as a pure
//! function: Migration -> Plan -> source Provider -> Hosts, and the host of
//! every VM of the Plan as seen by the provider inventory.

use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crate::store::ResourceKey;
use crds::{Migration, Plan, Provider, ProviderType};
use futures::{StreamExt, TryStreamExt, stream};
use kube::ResourceExt;
use provider_builder::{BuilderContext, HostMap, HostResolution};
use std::sync::Arc;
use tracing::debug;

/// Source provider of a Plan
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderResolution {
    /// Not looked up because the Plan is missing
    Unresolved,
    /// No Provider with the referenced name
    NotFound(ResourceKey),
    /// No builder is registered for the provider type
    Unsupported(ResourceKey, ProviderType),
    /// Provider found and supported
    Found(Box<Provider>),
}

/// Host of a VM of the Plan
#[derive(Debug, Clone, PartialEq)]
pub struct VmHost {
    /// VM inventory ID
    pub vm_id: String,
    /// Where the VM runs
    pub resolution: HostResolution,
}

/// Everything a Migration references, as read in one pass
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedReferences {
    /// Referenced Plan, `None` when missing
    pub plan: Option<Plan>,
    /// Source provider of the Plan
    pub provider: ProviderResolution,
    /// Host of every VM of the Plan, in Plan order. Empty unless the provider was found.
    pub hosts: Vec<VmHost>,
}

impl ResolvedReferences {
    fn missing_plan() -> Self {
        Self {
            plan: None,
            provider: ProviderResolution::Unresolved,
            hosts: Vec::new(),
        }
    }
}

impl Reconciler {
    /// Resolve the references of a Migration.
    ///
    /// Missing resources are reported in the result. Store and inventory
    /// failures are errors; no partial result is returned.
    pub(crate) async fn resolve(&self, migration: &Migration) -> Result<ResolvedReferences, ControllerError> {
        let ns = migration.namespace().unwrap_or_default();
        let plan_key = ResourceKey::new(migration.spec.plan.namespace_or(&ns), &migration.spec.plan.name);

        let Some(plan) = self.store.get_plan(&plan_key).await? else {
            debug!("Plan {} not found", plan_key);
            return Ok(ResolvedReferences::missing_plan());
        };

        let plan_ns = plan.namespace().unwrap_or_default();
        let source = &plan.spec.provider.source;
        let provider_key = ResourceKey::new(source.namespace_or(&plan_ns), &source.name);

        let Some(provider) = self.store.get_provider(&provider_key).await? else {
            debug!("Provider {} not found", provider_key);
            return Ok(ResolvedReferences {
                plan: Some(plan),
                provider: ProviderResolution::NotFound(provider_key),
                hosts: Vec::new(),
            });
        };

        let provider_type = provider.spec.r#type;
        if !self.registry.supports(provider_type) {
            return Ok(ResolvedReferences {
                plan: Some(plan),
                provider: ProviderResolution::Unsupported(provider_key, provider_type),
                hosts: Vec::new(),
            });
        }

        let provider = Arc::new(provider);
        let hosts = HostMap::for_provider(self.store.list_hosts().await?, &provider);
        let ctx = BuilderContext::connect(
            Arc::clone(&provider),
            self.connector.as_ref(),
            Arc::clone(&self.secrets),
            Arc::new(hosts),
        )?;
        let builder = self.registry.builder(ctx)?;

        // buffered() keeps Plan order while bounding inventory lookups in flight
        let builder = &builder;
        let vm_ids: Vec<String> = plan.spec.vms.iter().map(|vm| vm.id.clone()).collect();
        let lookups = vm_ids.into_iter().map(|vm_id| async move {
            let resolution = builder.resolve_host(&vm_id).await?;
            Ok::<_, ControllerError>(VmHost { vm_id, resolution })
        });
        let hosts: Vec<VmHost> = stream::iter(lookups)
            .buffered(self.settings.migration.max_in_flight.max(1))
            .try_collect()
            .await?;

        Ok(ResolvedReferences {
            plan: Some(plan),
            provider: ProviderResolution::Found(Box::new(Arc::unwrap_or_clone(provider))),
            hosts,
        })
    }
}
