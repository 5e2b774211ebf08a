//! VM import artifacts
//!
//! Provider-agnostic shapes consumed by the VM import operator. Builders
//! fully repopulate every field they own on each call.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Source of a mapping entry
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MappingSource {
    /// Source object ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Source object name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Target of a mapping entry
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectIdentifier {
    /// Target name (network attachment or storage class)
    pub name: String,

    /// Target namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Source network -> target network attachment
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkResourceMappingItem {
    /// Source network
    pub source: MappingSource,
    /// Target network attachment
    pub target: ObjectIdentifier,
}

/// Source datastore -> target storage class
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StorageResourceMappingItem {
    /// Source datastore
    pub source: MappingSource,
    /// Target storage class
    pub target: ObjectIdentifier,
}

/// vSphere mappings, in plan order
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmwareMappings {
    /// Network mappings
    #[serde(default)]
    pub network_mappings: Vec<NetworkResourceMappingItem>,

    /// Storage mappings
    #[serde(default)]
    pub storage_mappings: Vec<StorageResourceMappingItem>,
}

/// Resource mapping artifact
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMapping {
    /// vSphere mappings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vmware_mappings: Option<VmwareMappings>,
}

/// vSphere VM to import
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmwareSourceVm {
    /// VM UUID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// vSphere import source
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VmwareSourceSpec {
    /// VM to import
    pub vm: VmwareSourceVm,
}

/// Import source descriptor artifact
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportSourceSpec {
    /// vSphere source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vmware: Option<VmwareSourceSpec>,
}
