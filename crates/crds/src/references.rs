//! Kubernetes object references for virt CRDs
//!
//! Provides Kubernetes-style references used for cross-resource references
//! (Migration -> Plan, Plan -> Provider, Host -> Secret).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reference to another namespaced object by name.
///
/// The namespace is optional and defaults to the namespace of the
/// referencing resource.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    /// Name of the referenced resource
    pub name: String,

    /// Namespace of the referenced resource (defaults to same namespace as the referencing resource)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl ObjectReference {
    /// Create a new reference in the same namespace
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
        }
    }

    /// Create a new reference with an explicit namespace
    pub fn with_namespace(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
        }
    }

    /// Namespace of the referenced object, falling back to `default`.
    pub fn namespace_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.namespace.as_deref().unwrap_or(default)
    }
}

/// Reference to a Secret holding provider or host credentials.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SecretRef {
    /// Secret name
    pub name: String,

    /// Secret namespace (defaults to the namespace of the owning resource)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl SecretRef {
    /// Create a new secret reference
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
        }
    }

    /// Namespace of the secret, falling back to `default`.
    pub fn namespace_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.namespace.as_deref().unwrap_or(default)
    }
}
