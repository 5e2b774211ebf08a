//! Plan CRD
//!
//! Lists the VMs to migrate from a source provider and the network and
//! datastore mappings to apply. Plans are read-only input to the builders.

use crate::references::ObjectReference;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Plan specification
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[kube(
    group = "virt.konveyor.io",
    version = "v1alpha1",
    kind = "Plan",
    namespaced,
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct PlanSpec {
    /// Source and destination providers
    pub provider: PlanProvider,

    /// Network and datastore mappings
    #[serde(default)]
    pub map: Map,

    /// VMs to migrate
    #[serde(default)]
    pub vms: Vec<PlanVm>,
}

/// Providers of a Plan
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlanProvider {
    /// Source provider
    pub source: ObjectReference,

    /// Destination provider (defaults to the local cluster)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<ObjectReference>,
}

/// A VM selected for migration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlanVm {
    /// VM ID in the source provider inventory
    pub id: String,
}

/// Network and datastore mappings
///
/// Entry order is significant and is preserved by the builders.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Map {
    /// Source network -> destination network
    #[serde(default)]
    pub networks: Vec<NetworkPair>,

    /// Source datastore -> destination storage class
    #[serde(default)]
    pub datastores: Vec<StoragePair>,
}

impl Map {
    /// Source IDs that appear more than once in the network mappings.
    pub fn duplicate_network_sources(&self) -> Vec<String> {
        duplicates(self.networks.iter().map(|n| n.source.id.as_str()))
    }

    /// Source IDs that appear more than once in the datastore mappings.
    pub fn duplicate_datastore_sources(&self) -> Vec<String> {
        duplicates(self.datastores.iter().map(|d| d.source.id.as_str()))
    }
}

fn duplicates<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut repeated = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            repeated.insert(id.to_string());
        }
    }
    repeated.into_iter().collect()
}

/// Source object identified by its inventory ID
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    /// Inventory ID
    pub id: String,
}

/// Network mapping entry
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NetworkPair {
    /// Source network
    pub source: SourceRef,

    /// Destination network
    pub destination: DestinationNetwork,
}

/// Destination network attachment
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DestinationNetwork {
    /// Namespace of the destination network attachment
    #[serde(default)]
    pub namespace: String,

    /// Name of the destination network attachment
    pub name: String,
}

/// Datastore mapping entry
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StoragePair {
    /// Source datastore
    pub source: SourceRef,

    /// Destination storage
    pub destination: DestinationStorage,
}

/// Destination storage
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DestinationStorage {
    /// Destination storage class
    pub storage_class: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network(id: &str) -> NetworkPair {
        NetworkPair {
            source: SourceRef { id: id.to_string() },
            destination: DestinationNetwork {
                namespace: "ns".to_string(),
                name: format!("net-{id}"),
            },
        }
    }

    #[test]
    fn test_no_duplicates() {
        let map = Map {
            networks: vec![network("n1"), network("n2")],
            datastores: vec![],
        };
        assert!(map.duplicate_network_sources().is_empty());
    }

    #[test]
    fn test_duplicates_reported_once() {
        let map = Map {
            networks: vec![network("n1"), network("n2"), network("n1"), network("n1")],
            datastores: vec![],
        };
        assert_eq!(map.duplicate_network_sources(), vec!["n1".to_string()]);
    }

    #[test]
    fn test_map_deserializes_camel_case() {
        let map: Map = serde_json::from_value(serde_json::json!({
            "datastores": [
                { "source": { "id": "ds-1" }, "destination": { "storageClass": "fast" } }
            ]
        }))
        .unwrap();
        assert!(map.networks.is_empty());
        assert_eq!(map.datastores[0].destination.storage_class, "fast");
    }
}
