//! Host CRD
//!
//! Associates a source hypervisor host with the Secret holding its
//! credentials. Used to override provider credentials per host.

use crate::references::{ObjectReference, SecretRef};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Host specification
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[kube(
    group = "virt.konveyor.io",
    version = "v1alpha1",
    kind = "Host",
    namespaced,
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct HostSpec {
    /// Host ID in the provider inventory
    pub id: String,

    /// Provider the host belongs to
    pub provider: ObjectReference,

    /// Management IP address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,

    /// Credentials for the host
    pub secret: SecretRef,
}
