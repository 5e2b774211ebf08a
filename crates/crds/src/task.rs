//! Migration task model
//!
//! A task is one unit of migration work (typically one disk) with a
//! measurable completion total.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Annotation key recording the unit of a task's progress.
pub const UNIT_ANNOTATION: &str = "unit";

/// Progress of a task in arbitrary units
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Total units of work
    pub total: i64,

    /// Units completed
    #[serde(default)]
    pub completed: i64,
}

impl Progress {
    /// Progress with nothing completed yet.
    pub fn of(total: i64) -> Self {
        Self { total, completed: 0 }
    }
}

/// A unit of migration work
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Task name
    pub name: String,

    /// Progress
    pub progress: Progress,

    /// Free-form annotations (e.g. `unit: MB`)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}
