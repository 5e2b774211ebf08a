//! Migration settings

use crate::env::get_env_limit;
use crate::error::SettingsError;

/// Max concurrent inventory lookups per reconciliation
pub const MAX_VM_INFLIGHT: &str = "MAX_VM_INFLIGHT";
/// Max parallel reconciliations across resources
pub const RECONCILE_CONCURRENCY: &str = "RECONCILE_CONCURRENCY";
/// Namespace to watch (all namespaces when unset)
pub const WATCH_NAMESPACE: &str = "WATCH_NAMESPACE";

/// Migration controller limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationSettings {
    /// Max VMs whose inventory is queried concurrently
    pub max_in_flight: usize,
    /// Max reconciliations running in parallel (distinct keys only)
    pub reconcile_concurrency: usize,
    /// Namespace to watch
    pub namespace: Option<String>,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            max_in_flight: 20,
            reconcile_concurrency: 4,
            namespace: None,
        }
    }
}

impl MigrationSettings {
    pub(crate) fn load<F>(lookup: &F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            max_in_flight: get_env_limit(lookup, MAX_VM_INFLIGHT, defaults.max_in_flight)?,
            reconcile_concurrency: get_env_limit(
                lookup,
                RECONCILE_CONCURRENCY,
                defaults.reconcile_concurrency,
            )?,
            namespace: lookup(WATCH_NAMESPACE).filter(|ns| !ns.trim().is_empty()),
        })
    }
}
