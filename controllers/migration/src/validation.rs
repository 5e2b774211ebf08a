//! Migration validation.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. `PlanNotFound`: the referenced Plan does not exist.
//! 2. `ProviderNotValid`: the Plan's source Provider is missing or has no builder.
//! 3. `NetworkMapNotValid` / `DatastoreMapNotValid`: a source ID is mapped twice.
//! 4. `VMNotFound`: the inventory rejected a VM of the Plan.
//! 5. `HostNotValid`: a VM's Host resource names no credential Secret.
//!
//! A failure becomes a Critical condition whose type and reason are the
//! check name.

use crate::references::{ProviderResolution, ResolvedReferences};
use crds::{Category, Condition, Migration};
use inventory_client::StatusCode;
use kube::ResourceExt;
use provider_builder::HostResolution;
use thiserror::Error;

/// First validation failure of a Migration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Referenced Plan not found
    #[error("Plan {0} not found.")]
    PlanNotFound(String),

    /// Source provider missing or unsupported
    #[error("Source provider {provider} is not valid: {reason}.")]
    ProviderNotValid {
        /// Provider namespace/name
        provider: String,
        /// Why it cannot be used
        reason: String,
    },

    /// Network mapped more than once
    #[error("Network map has duplicate source IDs: {}.", .0.join(", "))]
    NetworkMapNotValid(Vec<String>),

    /// Datastore mapped more than once
    #[error("Datastore map has duplicate source IDs: {}.", .0.join(", "))]
    DatastoreMapNotValid(Vec<String>),

    /// Inventory rejected a VM
    #[error("VM {vm_id} not found: {reason}.")]
    VmNotFound {
        /// VM ID
        vm_id: String,
        /// Inventory status text
        reason: String,
    },

    /// Host resource without a Secret
    #[error("Host {host} of VM {vm_id} has no secret.")]
    HostNotValid {
        /// Host namespace/name
        host: String,
        /// VM ID
        vm_id: String,
    },
}

impl ValidationError {
    /// Condition type raised for this failure.
    pub fn condition_type(&self) -> &'static str {
        match self {
            Self::PlanNotFound(_) => "PlanNotFound",
            Self::ProviderNotValid { .. } => "ProviderNotValid",
            Self::NetworkMapNotValid(_) => "NetworkMapNotValid",
            Self::DatastoreMapNotValid(_) => "DatastoreMapNotValid",
            Self::VmNotFound { .. } => "VMNotFound",
            Self::HostNotValid { .. } => "HostNotValid",
        }
    }

    /// Blocking condition for this failure.
    pub fn to_condition(&self) -> Condition {
        let r#type = self.condition_type();
        Condition::new(r#type, Category::Critical, r#type, self.to_string())
    }
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map_or_else(|| status.as_str().to_string(), str::to_string)
}

/// Validate a Migration against its resolved references.
pub fn validate(migration: &Migration, refs: &ResolvedReferences) -> Result<(), ValidationError> {
    let Some(plan) = &refs.plan else {
        let ns = migration.namespace().unwrap_or_default();
        let reference = &migration.spec.plan;
        return Err(ValidationError::PlanNotFound(format!(
            "{}/{}",
            reference.namespace_or(&ns),
            reference.name
        )));
    };

    match &refs.provider {
        ProviderResolution::Found(_) => {}
        ProviderResolution::Unresolved => {
            return Err(ValidationError::ProviderNotValid {
                provider: plan.spec.provider.source.name.clone(),
                reason: "not resolved".to_string(),
            });
        }
        ProviderResolution::NotFound(key) => {
            return Err(ValidationError::ProviderNotValid {
                provider: key.to_string(),
                reason: "not found".to_string(),
            });
        }
        ProviderResolution::Unsupported(key, provider_type) => {
            return Err(ValidationError::ProviderNotValid {
                provider: key.to_string(),
                reason: format!("provider type {provider_type} is not supported"),
            });
        }
    }

    let duplicates = plan.spec.map.duplicate_network_sources();
    if !duplicates.is_empty() {
        return Err(ValidationError::NetworkMapNotValid(duplicates));
    }
    let duplicates = plan.spec.map.duplicate_datastore_sources();
    if !duplicates.is_empty() {
        return Err(ValidationError::DatastoreMapNotValid(duplicates));
    }

    for vm in &refs.hosts {
        if let HostResolution::Rejected(status) = &vm.resolution {
            return Err(ValidationError::VmNotFound {
                vm_id: vm.vm_id.clone(),
                reason: status_text(*status),
            });
        }
    }
    for vm in &refs.hosts {
        if let HostResolution::Mapped(host) = &vm.resolution
            && host.spec.secret.name.is_empty()
        {
            return Err(ValidationError::HostNotValid {
                host: format!("{}/{}", host.namespace().unwrap_or_default(), host.name_any()),
                vm_id: vm.vm_id.clone(),
            });
        }
    }

    Ok(())
}
