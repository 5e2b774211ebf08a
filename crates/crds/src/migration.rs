//! Migration CRD
//!
//! Declares the intent to migrate the VMs listed by a Plan. The controller
//! only ever writes the status subresource.

use crate::conditions::{self, Condition};
use crate::references::ObjectReference;
use chrono::{DateTime, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Migration specification
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[kube(
    group = "virt.konveyor.io",
    version = "v1alpha1",
    kind = "Migration",
    namespaced,
    derive = "PartialEq",
    status = "MigrationStatus",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct MigrationSpec {
    /// Reference to the Plan to execute
    pub plan: ObjectReference,
}

/// Migration status
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MigrationStatus {
    /// Latest observations of the migration
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Generation the conditions were computed for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

impl MigrationStatus {
    /// Whether any condition blocks readiness.
    pub fn has_blocker_condition(&self) -> bool {
        conditions::has_blocker_condition(&self.conditions)
    }

    /// Set the `Ready` condition.
    pub fn set_ready(&mut self, ready: bool, message: &str, now: DateTime<Utc>) {
        conditions::set_condition(&mut self.conditions, Condition::ready(ready, message), now);
    }

    /// Add or replace a condition.
    pub fn set_condition(&mut self, condition: Condition, now: DateTime<Utc>) {
        conditions::set_condition(&mut self.conditions, condition, now);
    }

    /// Find a condition by type.
    pub fn find_condition(&self, r#type: &str) -> Option<&Condition> {
        conditions::find_condition(&self.conditions, r#type)
    }

    /// Whether the `Ready` condition is `True`.
    pub fn is_ready(&self) -> bool {
        conditions::is_ready(&self.conditions)
    }
}
