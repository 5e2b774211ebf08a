//! vSphere builder
//!
//! Builds import artifacts for VMs hosted on VMware vSphere.

use crate::builder::{Builder as BuilderTrait, BuilderContext};
use crate::error::BuilderError;
use crate::host::HostResolution;
use crds::{
    ImportSourceSpec, Map, MappingSource, NetworkResourceMappingItem, ObjectIdentifier, Progress,
    ProviderType, ResourceMapping, StorageResourceMappingItem, Task, VmwareMappings,
    VmwareSourceSpec, VmwareSourceVm, UNIT_ANNOTATION,
};
use inventory_client::{get_into, vsphere, StatusCode};
use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use std::collections::BTreeMap;
use tracing::debug;

/// Key of the credential payload in the Secret's string data
pub const SECRET_KEY: &str = "vmware";

/// Bytes per megabyte
const MIB: i64 = 0x0010_0000;

/// vSphere builder
#[derive(Debug)]
pub struct Builder {
    ctx: BuilderContext,
}

impl Builder {
    /// Creates a new vSphere builder.
    pub fn new(ctx: BuilderContext) -> Self {
        Self { ctx }
    }

    /// Factory suitable for the registry.
    pub fn boxed(ctx: BuilderContext) -> Box<dyn BuilderTrait> {
        Box::new(Self::new(ctx))
    }

    /// Fetch the VM from the inventory.
    ///
    /// Returns the status on anything but 200 so callers can choose between
    /// falling back and failing.
    async fn vm(&self, vm_id: &str) -> Result<Result<vsphere::Vm, StatusCode>, BuilderError> {
        let mut vm = vsphere::Vm::default();
        let status = get_into(self.ctx.inventory.as_ref(), &mut vm, vm_id)
            .await
            .map_err(|source| BuilderError::Lookup {
                provider: ProviderType::Vsphere,
                vm_id: vm_id.to_string(),
                source,
            })?;
        if status == StatusCode::OK {
            Ok(Ok(vm))
        } else {
            debug!("Inventory answered {} for VM {}", status, vm_id);
            Ok(Err(status))
        }
    }

    /// Fetch the VM, treating any non-OK status as a remote rejection.
    async fn required_vm(&self, vm_id: &str) -> Result<vsphere::Vm, BuilderError> {
        self.vm(vm_id)
            .await?
            .map_err(|status| BuilderError::rejected(ProviderType::Vsphere, vm_id, status))
    }

    /// Get the host secret, `None` when no override is configured.
    async fn host_secret(&self, vm_id: &str) -> Result<Option<Secret>, BuilderError> {
        let host = match self.resolve_host(vm_id).await? {
            HostResolution::Mapped(host) => host,
            HostResolution::Unmapped { host_id } => {
                debug!("VM {} host {} has no Host resource", vm_id, host_id);
                return Ok(None);
            }
            HostResolution::Rejected(status) if status == StatusCode::NOT_FOUND => return Ok(None),
            HostResolution::Rejected(status) => {
                return Err(BuilderError::rejected(ProviderType::Vsphere, vm_id, status));
            }
        };

        let host_ns = host.namespace().unwrap_or_default();
        let reference = &host.spec.secret;
        let namespace = reference.namespace_or(&host_ns);
        self.ctx
            .secrets
            .get_secret(namespace, &reference.name)
            .await
            .map_err(|source| BuilderError::Secret {
                provider: ProviderType::Vsphere,
                host_id: host.spec.id.clone(),
                namespace: namespace.to_string(),
                name: reference.name.clone(),
                source,
            })
    }
}

/// Read a key of a Secret's data as UTF-8.
fn data_field(secret: &Secret, key: &str) -> String {
    secret
        .data
        .as_ref()
        .and_then(|data| data.get(key))
        .map(|bytes| String::from_utf8_lossy(&bytes.0).into_owned())
        .unwrap_or_default()
}

#[async_trait::async_trait]
impl BuilderTrait for Builder {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Vsphere
    }

    async fn secret(&self, vm_id: &str, fallback: &Secret, object: &mut Secret) -> Result<(), BuilderError> {
        let host_secret = self.host_secret(vm_id).await?;
        let credentials = host_secret.as_ref().unwrap_or(fallback);

        let content = serde_yaml::to_string(&BTreeMap::from([
            ("apiUrl", self.ctx.provider.spec.url.clone()),
            ("username", data_field(credentials, "user")),
            ("password", data_field(credentials, "password")),
            ("thumbprint", data_field(credentials, "thumbprint")),
        ]))
        .map_err(|source| BuilderError::Encode {
            provider: ProviderType::Vsphere,
            source,
        })?;

        object.string_data = Some(BTreeMap::from([(SECRET_KEY.to_string(), content)]));
        Ok(())
    }

    fn mapping(&self, map: &Map, object: &mut ResourceMapping) -> Result<(), BuilderError> {
        let network_mappings = map
            .networks
            .iter()
            .map(|network| NetworkResourceMappingItem {
                source: MappingSource {
                    id: Some(network.source.id.clone()),
                    name: None,
                },
                target: ObjectIdentifier {
                    name: network.destination.name.clone(),
                    namespace: Some(network.destination.namespace.clone()),
                },
            })
            .collect();
        let storage_mappings = map
            .datastores
            .iter()
            .map(|ds| StorageResourceMappingItem {
                source: MappingSource {
                    id: Some(ds.source.id.clone()),
                    name: None,
                },
                target: ObjectIdentifier {
                    name: ds.destination.storage_class.clone(),
                    namespace: None,
                },
            })
            .collect();

        object.vmware_mappings = Some(VmwareMappings {
            network_mappings,
            storage_mappings,
        });
        Ok(())
    }

    async fn source(&self, vm_id: &str, object: &mut ImportSourceSpec) -> Result<(), BuilderError> {
        let vm = self.required_vm(vm_id).await?;
        object.vmware = Some(VmwareSourceSpec {
            vm: VmwareSourceVm { id: Some(vm.uuid) },
        });
        Ok(())
    }

    async fn tasks(&self, vm_id: &str) -> Result<Vec<Task>, BuilderError> {
        let vm = self.required_vm(vm_id).await?;
        let tasks = vm
            .disks
            .into_iter()
            .map(|disk| Task {
                name: disk.file,
                progress: Progress::of(disk.capacity / MIB),
                annotations: BTreeMap::from([(UNIT_ANNOTATION.to_string(), "MB".to_string())]),
            })
            .collect();
        Ok(tasks)
    }

    async fn resolve_host(&self, vm_id: &str) -> Result<HostResolution, BuilderError> {
        let vm = match self.vm(vm_id).await? {
            Ok(vm) => vm,
            Err(status) => return Ok(HostResolution::Rejected(status)),
        };
        let resolution = match self.ctx.hosts.get(&vm.host.id) {
            Some(host) => HostResolution::Mapped(Box::new(host.clone())),
            None => HostResolution::Unmapped { host_id: vm.host.id },
        };
        Ok(resolution)
    }
}
