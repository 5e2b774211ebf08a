//! Migration reconciliation.
//!
//! Each pass fetches the Migration, resolves and validates its references,
//! recomputes the status from scratch and writes it back once. The spec is
//! never modified.

use crate::backoff::FibonacciBackoff;
use crate::error::ControllerError;
use crate::references::ProviderResolution;
use crate::status::compute_status;
use crate::store::{MigrationStore, ResourceKey};
use crate::validation::validate;
use chrono::Utc;
use kube::ResourceExt;
use provider_builder::{InventoryConnector, Registry, SecretLookup};
use settings::Settings;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Outcome of a successful pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Nothing left to do until the resource changes
    Done,
    /// Run again shortly
    Requeue,
}

/// Backoff state for a resource
#[derive(Debug, Clone)]
struct BackoffState {
    backoff: FibonacciBackoff,
    error_count: u32,
}

impl BackoffState {
    fn new() -> Self {
        Self {
            backoff: FibonacciBackoff::new(1, 60), // 1 second min, 60 seconds max
            error_count: 0,
        }
    }
}

/// Reconciles Migration resources.
pub struct Reconciler {
    pub(crate) store: Arc<dyn MigrationStore>,
    pub(crate) registry: Registry,
    pub(crate) connector: Arc<dyn InventoryConnector>,
    pub(crate) secrets: Arc<dyn SecretLookup>,
    pub(crate) settings: Arc<Settings>,
    /// Error tracking per resource (namespace/name -> BackoffState)
    backoff_states: Mutex<HashMap<ResourceKey, BackoffState>>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("registry", &self.registry)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Creates a new reconciler.
    pub fn new(
        store: Arc<dyn MigrationStore>,
        registry: Registry,
        connector: Arc<dyn InventoryConnector>,
        secrets: Arc<dyn SecretLookup>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            store,
            registry,
            connector,
            secrets,
            settings,
            backoff_states: Mutex::new(HashMap::new()),
        }
    }

    /// Reconcile the Migration with `key`.
    ///
    /// A missing Migration is `Done`. Fetch and resolution failures are
    /// errors. A failed status write is logged and requeued: the next pass
    /// recomputes the status from scratch. A blocked Migration is requeued
    /// so blockers are re-evaluated.
    #[instrument(skip(self, key), fields(migration = %key))]
    pub async fn reconcile(&self, key: &ResourceKey) -> Result<ReconcileOutcome, ControllerError> {
        let Some(migration) = self.store.get_migration(key).await? else {
            debug!("Migration {} not found, assuming deleted", key);
            return Ok(ReconcileOutcome::Done);
        };

        let refs = self.resolve(&migration).await?;
        if let ProviderResolution::Found(provider) = &refs.provider {
            debug!(
                "Source provider {} ({}), {} VM(s) resolved",
                provider.name_any(),
                provider.spec.r#type,
                refs.hosts.len()
            );
        }
        let blockers: Vec<_> = match validate(&migration, &refs) {
            Ok(()) => Vec::new(),
            Err(e) => {
                info!("Migration {} blocked: {}", key, e);
                vec![e.to_condition()]
            }
        };
        let blocked = !blockers.is_empty();

        let generation = migration.metadata.generation.unwrap_or_default();
        let status = compute_status(migration.status.as_ref(), generation, blockers, Utc::now());

        if let Err(e) = self.store.update_status(&migration, &status).await {
            if e.is_conflict() {
                debug!("Migration {} changed while reconciling, requeueing", key);
            } else {
                warn!("Failed to update status of Migration {}: {}", key, e);
            }
            return Ok(ReconcileOutcome::Requeue);
        }

        if blocked {
            Ok(ReconcileOutcome::Requeue)
        } else {
            debug!("Migration {} ready (generation {})", key, generation);
            Ok(ReconcileOutcome::Done)
        }
    }

    /// Next retry delay for a resource whose reconciliation failed.
    pub fn next_backoff(&self, key: &ResourceKey) -> (Duration, u32) {
        match self.backoff_states.lock() {
            Ok(mut states) => {
                let state = states.entry(key.clone()).or_insert_with(BackoffState::new);
                state.error_count += 1;
                (state.backoff.next_backoff(), state.error_count)
            }
            Err(e) => {
                warn!("Failed to lock backoff_states: {}, using default backoff", e);
                (Duration::from_secs(1), 0)
            }
        }
    }

    /// Forget the failure history of a resource (on successful reconciliation).
    pub fn reset_backoff(&self, key: &ResourceKey) {
        if let Ok(mut states) = self.backoff_states.lock() {
            states.remove(key);
        }
    }
}
