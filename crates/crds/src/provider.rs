//! Provider CRD
//!
//! A source or destination virtualization provider.

use crate::references::SecretRef;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider specification
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[kube(
    group = "virt.konveyor.io",
    version = "v1alpha1",
    kind = "Provider",
    namespaced,
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSpec {
    /// Provider type
    pub r#type: ProviderType,

    /// API endpoint URL (e.g. "https://vcenter.example.com/sdk")
    #[serde(default)]
    pub url: String,

    /// Credentials used to reach the provider API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<SecretRef>,
}

/// Provider type tag used to select a builder
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// VMware vSphere
    #[serde(alias = "vSphere")]
    Vsphere,

    /// OpenShift / KubeVirt
    Openshift,
}

impl ProviderType {
    /// Lowercase tag, as used in inventory paths.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vsphere => "vsphere",
            Self::Openshift => "openshift",
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
