//! Migration status computation.
//!
//! Status is recomputed from scratch on every pass. Nothing here performs
//! I/O, so the same inputs always yield the same status.

use chrono::{DateTime, Utc};
use crds::{Condition, MigrationStatus, READY, has_blocker_condition};

/// Message of the `Ready` condition.
pub const READY_MESSAGE: &str = "The migration is ready.";

/// Compute the status of a Migration for `generation`.
///
/// Conditions left by the previous pass are dropped and `blockers` are set in
/// their place. `Ready` is set to `True` iff no blocker is `True`. The
/// transition time of a condition that kept its status is carried over from
/// `previous`, so recomputing an unchanged resource yields an identical status.
pub fn compute_status(
    previous: Option<&MigrationStatus>,
    generation: i64,
    blockers: Vec<Condition>,
    now: DateTime<Utc>,
) -> MigrationStatus {
    // Start from the previous conditions so set_condition sees their transition times
    let mut next = MigrationStatus {
        conditions: previous.map(|s| s.conditions.clone()).unwrap_or_default(),
        observed_generation: Some(generation),
    };

    let mut current: Vec<String> = Vec::with_capacity(blockers.len() + 1);
    let blocked = has_blocker_condition(&blockers);
    for blocker in blockers {
        current.push(blocker.r#type.clone());
        next.set_condition(blocker, now);
    }
    if !blocked {
        current.push(READY.to_string());
        next.set_ready(true, READY_MESSAGE, now);
    }

    next.conditions.retain(|c| current.contains(&c.r#type));
    next
}
