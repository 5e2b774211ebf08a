//! Status conditions
//!
//! Conditions represent the latest observations of a resource. A condition
//! with status `True` in the `Critical` or `Error` category blocks the
//! resource from becoming ready.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Condition type raised once no blocking condition remains.
pub const READY: &str = "Ready";

/// Condition status value for a condition that holds.
pub const TRUE: &str = "True";

/// Condition status value for a condition that does not hold.
pub const FALSE: &str = "False";

/// Condition category
///
/// Serializes as PascalCase ("Critical", "Error", ...).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "PascalCase")]
pub enum Category {
    /// The resource cannot be processed at all
    Critical,

    /// The resource is in error
    Error,

    /// Something the user should look at
    Warn,

    /// Required for the resource to be considered ready
    Required,

    /// Informational only
    #[default]
    Advisory,
}

impl Category {
    /// Whether a condition of this category blocks readiness.
    pub fn is_blocker(self) -> bool {
        matches!(self, Self::Critical | Self::Error)
    }
}

/// Condition represents a condition of a resource
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition
    pub r#type: String,

    /// Status of the condition ("True" or "False")
    pub status: String,

    /// Machine-readable reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Condition category
    #[serde(default)]
    pub category: Category,

    /// Human-readable message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Last time the status of this condition changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,
}

impl Condition {
    /// Create a condition with status `True`.
    pub fn new(
        r#type: impl Into<String>,
        category: Category,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            r#type: r#type.into(),
            status: TRUE.to_string(),
            reason: Some(reason.into()),
            category,
            message: Some(message.into()),
            last_transition_time: None,
        }
    }

    /// The `Ready` condition.
    pub fn ready(ready: bool, message: impl Into<String>) -> Self {
        Self {
            r#type: READY.to_string(),
            status: if ready { TRUE } else { FALSE }.to_string(),
            reason: None,
            category: Category::Required,
            message: Some(message.into()),
            last_transition_time: None,
        }
    }

    /// Whether the condition status is `True`.
    pub fn is_true(&self) -> bool {
        self.status == TRUE
    }

    /// Whether this condition currently blocks readiness.
    pub fn is_blocker(&self) -> bool {
        self.is_true() && self.category.is_blocker()
    }
}

/// Find a condition by type.
pub fn find_condition<'a>(conditions: &'a [Condition], r#type: &str) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.r#type == r#type)
}

/// Add or replace a condition, stamping the transition time.
///
/// The previous `last_transition_time` is kept when a condition of the same
/// type already exists with the same status, so re-setting an unchanged
/// condition is a no-op.
pub fn set_condition(conditions: &mut Vec<Condition>, mut condition: Condition, now: DateTime<Utc>) {
    match conditions.iter_mut().find(|c| c.r#type == condition.r#type) {
        Some(existing) => {
            condition.last_transition_time = if existing.status == condition.status {
                existing.last_transition_time.or(Some(now))
            } else {
                Some(now)
            };
            *existing = condition;
        }
        None => {
            condition.last_transition_time = Some(now);
            conditions.push(condition);
        }
    }
}

/// Whether any condition blocks readiness.
pub fn has_blocker_condition(conditions: &[Condition]) -> bool {
    conditions.iter().any(Condition::is_blocker)
}

/// Whether the `Ready` condition is present and `True`.
pub fn is_ready(conditions: &[Condition]) -> bool {
    find_condition(conditions, READY).is_some_and(Condition::is_true)
}
