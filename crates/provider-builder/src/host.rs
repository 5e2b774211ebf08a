//! Host map
//!
//! Immutable snapshot of the Host resources of one provider, keyed by the
//! host's inventory ID. Shared as `Arc<HostMap>`: an update publishes a new
//! snapshot, so readers see either the old or the new map, never a mix.

use crds::{Host, Provider};
use inventory_client::StatusCode;
use kube::ResourceExt;
use std::collections::HashMap;
use tracing::warn;

/// Result of resolving the host of a VM
#[derive(Debug, Clone, PartialEq)]
pub enum HostResolution {
    /// The inventory rejected the VM query
    Rejected(StatusCode),
    /// The VM runs on a host with no Host resource
    Unmapped {
        /// Inventory host ID
        host_id: String,
    },
    /// The VM runs on a host with a Host resource
    Mapped(Box<Host>),
}

/// Host ID -> Host
#[derive(Debug, Clone, Default)]
pub struct HostMap {
    hosts: HashMap<String, Host>,
}

impl HostMap {
    /// Build the map from the Hosts that belong to `provider`.
    ///
    /// A Host's provider reference without a namespace refers to the Host's
    /// own namespace. When two Hosts claim the same ID the first one wins.
    pub fn for_provider(hosts: impl IntoIterator<Item = Host>, provider: &Provider) -> Self {
        let provider_name = provider.name_any();
        let provider_ns = provider.namespace().unwrap_or_default();

        let mut map = HashMap::new();
        for host in hosts {
            let host_ns = host.namespace().unwrap_or_default();
            let reference = &host.spec.provider;
            if reference.name != provider_name || reference.namespace_or(&host_ns) != provider_ns {
                continue;
            }
            if map.contains_key(&host.spec.id) {
                warn!(
                    "Host {}/{} duplicates host ID {}, ignoring",
                    host_ns,
                    host.name_any(),
                    host.spec.id
                );
                continue;
            }
            map.insert(host.spec.id.clone(), host);
        }
        Self { hosts: map }
    }

    /// Look up a Host by inventory host ID.
    pub fn get(&self, host_id: &str) -> Option<&Host> {
        self.hosts.get(host_id)
    }

    /// Number of mapped hosts.
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Whether no host is mapped.
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}
