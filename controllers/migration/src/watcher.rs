//! Kubernetes resource watchers.
//!
//! Runs a kube_runtime::Controller over Migrations. Plans are watched as
//! well: a Plan change re-opens evaluation of every Migration referencing it.

use crate::error::ControllerError;
use crate::reconciler::{ReconcileOutcome, Reconciler};
use crate::store::ResourceKey;
use crds::{Migration, Plan};
use futures::StreamExt;
use kube::{Api, ResourceExt};
use kube_runtime::controller::{Action, Config as ControllerConfig};
use kube_runtime::reflector::ObjectRef;
use kube_runtime::{Controller, watcher};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Delay before a requeued Migration is reconciled again
const REQUEUE_DELAY: Duration = Duration::from_secs(1);

async fn reconcile(migration: Arc<Migration>, reconciler: Arc<Reconciler>) -> Result<Action, ControllerError> {
    let key = ResourceKey::of(migration.as_ref());
    let outcome = reconciler.reconcile(&key).await?;
    reconciler.reset_backoff(&key);
    Ok(match outcome {
        ReconcileOutcome::Done => Action::await_change(),
        ReconcileOutcome::Requeue => Action::requeue(REQUEUE_DELAY),
    })
}

fn error_policy(migration: Arc<Migration>, error: &ControllerError, reconciler: Arc<Reconciler>) -> Action {
    let key = ResourceKey::of(migration.as_ref());
    let (delay, attempt) = reconciler.next_backoff(&key);
    warn!(
        migration = %key,
        error = %error,
        attempt = attempt,
        "Reconciliation failed, retrying in {:?}",
        delay
    );
    Action::requeue(delay)
}

/// Migrations that reference `plan`.
pub(crate) fn migrations_for_plan(migrations: &[Arc<Migration>], plan: &Plan) -> Vec<ObjectRef<Migration>> {
    let plan_name = plan.name_any();
    let plan_ns = plan.namespace().unwrap_or_default();
    migrations
        .iter()
        .filter(|m| {
            let ns = m.namespace().unwrap_or_default();
            m.spec.plan.name == plan_name && m.spec.plan.namespace_or(&ns) == plan_ns
        })
        .map(|m| ObjectRef::from_obj(m.as_ref()))
        .collect()
}

/// Watches Migrations and Plans.
pub struct Watcher {
    reconciler: Arc<Reconciler>,
    migration_api: Api<Migration>,
    plan_api: Api<Plan>,
    concurrency: u16,
}

impl Watcher {
    /// Creates a new watcher instance.
    pub fn new(
        reconciler: Arc<Reconciler>,
        migration_api: Api<Migration>,
        plan_api: Api<Plan>,
        concurrency: usize,
    ) -> Self {
        Self {
            reconciler,
            migration_api,
            plan_api,
            concurrency: u16::try_from(concurrency).unwrap_or(u16::MAX),
        }
    }

    /// Run until a termination signal is received.
    pub async fn run(self) -> Result<(), ControllerError> {
        info!("Starting Migration watcher (concurrency {})", self.concurrency);

        let controller = Controller::new(self.migration_api, watcher::Config::default());
        let migrations = controller.store();

        controller
            .watches(self.plan_api, watcher::Config::default(), move |plan: Plan| {
                migrations_for_plan(&migrations.state(), &plan)
            })
            .with_config(ControllerConfig::default().concurrency(self.concurrency))
            .shutdown_on_signal()
            .run(reconcile, error_policy, self.reconciler)
            .for_each(|res| async move {
                match res {
                    Ok((obj, _action)) => debug!("Reconciled Migration {}", obj),
                    Err(e) => warn!("Migration controller error: {}", e),
                }
            })
            .await;

        info!("Migration watcher stopped");
        Ok(())
    }
}
