//! Main controller implementation.
//!
//! Wires the Kubernetes client, the inventory connector and the secret
//! lookup into a [`Reconciler`] and runs the Migration watcher.

use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crate::store::KubeStore;
use crate::watcher::Watcher;
use crds::{Migration, Plan};
use kube::{Api, Client};
use provider_builder::{KubeSecretLookup, Registry};
use settings::Settings;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Main controller for Migration readiness.
pub struct Controller {
    migration_watcher: JoinHandle<Result<(), ControllerError>>,
}

impl Controller {
    /// Creates a new controller instance and starts its watcher.
    pub async fn new(settings: Arc<Settings>) -> Result<Self, ControllerError> {
        info!("Initializing Migration Controller");

        let kube_client = Client::try_default().await?;
        let namespace = settings.migration.namespace.clone();

        let (migration_api, plan_api): (Api<Migration>, Api<Plan>) = match namespace.as_deref() {
            Some(ns) => (
                Api::namespaced(kube_client.clone(), ns),
                Api::namespaced(kube_client.clone(), ns),
            ),
            None => (Api::all(kube_client.clone()), Api::all(kube_client.clone())),
        };

        let reconciler = Arc::new(Reconciler::new(
            Arc::new(KubeStore::new(kube_client.clone(), namespace)),
            Registry::default(),
            Arc::new(settings.inventory.clone()),
            Arc::new(KubeSecretLookup::new(kube_client)),
            Arc::clone(&settings),
        ));

        let watcher = Watcher::new(
            reconciler,
            migration_api,
            plan_api,
            settings.migration.reconcile_concurrency,
        );
        let migration_watcher = tokio::spawn(watcher.run());

        Ok(Self { migration_watcher })
    }

    /// Runs the controller until shutdown.
    pub async fn run(self) -> Result<(), ControllerError> {
        info!("Migration Controller running");
        self.migration_watcher
            .await
            .map_err(|e| ControllerError::Watch(format!("Migration watcher panicked: {e}")))?
    }
}
