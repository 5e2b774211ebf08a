//! Unit tests for the Migration reconciler

#[cfg(test)]
mod tests {
    use crate::error::ControllerError;
    use crate::reconciler::ReconcileOutcome;
    use crate::status::READY_MESSAGE;
    use crate::store::{ResourceKey, StoreError};
    use crate::test_utils::*;
    use crds::{Migration, ProviderType, READY};
    use inventory_client::{InventoryResource, MockInventoryClient, StatusCode, vsphere};
    use provider_builder::{Builder as _, BuilderContext, BuilderError, HostMap, MemorySecretLookup, Registry};
    use std::sync::Arc;
    use std::time::Duration;

    const HOST_ID: &str = "host-1";

    fn key(name: &str) -> ResourceKey {
        ResourceKey::new(NAMESPACE, name)
    }

    /// Migration "m1" -> Plan "plan" (vm-1) -> Provider "vcenter", Host "esx-1" with Secret "esx-creds"
    fn scenario() -> (Arc<MemoryStore>, MockInventoryClient) {
        let store = Arc::new(MemoryStore::new());
        store.add_migration(create_test_migration("m1", NAMESPACE, "plan", 3));
        store.add_plan(create_test_plan("plan", NAMESPACE, "vcenter", &["vm-1"]));
        store.add_provider(create_test_provider("vcenter", NAMESPACE, "uid-1"));
        store.add_host(create_test_host("esx-1", NAMESPACE, HOST_ID, "vcenter", "esx-creds"));

        let inventory = MockInventoryClient::new("http://inventory");
        inventory.add_vm(create_test_vm("vm-1", HOST_ID, &[2_097_152, 524_288]));
        (store, inventory)
    }

    fn stored(store: &MemoryStore, name: &str) -> Migration {
        store.migration(&key(name)).unwrap()
    }

    fn condition_types(migration: &Migration) -> Vec<String> {
        migration
            .status
            .as_ref()
            .map(|s| s.conditions.iter().map(|c| c.r#type.clone()).collect())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_missing_migration_is_done() {
        let store = Arc::new(MemoryStore::new());
        let reconciler = create_test_reconciler(Arc::clone(&store), MockInventoryClient::new("http://inventory"));

        let outcome = reconciler.reconcile(&key("gone")).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::Done);
        assert_eq!(store.status_writes(), 0);
    }

    #[tokio::test]
    async fn test_end_to_end_ready() {
        let (store, inventory) = scenario();
        let reconciler = create_test_reconciler(Arc::clone(&store), inventory.clone());

        let outcome = reconciler.reconcile(&key("m1")).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::Done);
        let migration = stored(&store, "m1");
        let status = migration.status.as_ref().unwrap();
        assert!(status.is_ready());
        assert_eq!(status.observed_generation, Some(3));
        assert_eq!(
            status.find_condition(READY).unwrap().message.as_deref(),
            Some(READY_MESSAGE)
        );
        assert_eq!(condition_types(&migration), vec![READY.to_string()]);
        assert_eq!(store.status_writes(), 1);

        // The same inventory drives the builder for the plan's VM
        let provider = create_test_provider("vcenter", NAMESPACE, "uid-1");
        let hosts = HostMap::for_provider(
            vec![create_test_host("esx-1", NAMESPACE, HOST_ID, "vcenter", "esx-creds")],
            &provider,
        );
        let builder = Registry::default()
            .builder(BuilderContext::new(
                Arc::new(provider),
                Arc::new(inventory),
                Arc::new(MemorySecretLookup::new()),
                Arc::new(hosts),
            ))
            .unwrap();
        let totals: Vec<i64> = builder
            .tasks("vm-1")
            .await
            .unwrap()
            .iter()
            .map(|t| t.progress.total)
            .collect();
        assert_eq!(totals, vec![2, 0]);
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let (store, inventory) = scenario();
        let reconciler = create_test_reconciler(Arc::clone(&store), inventory);

        reconciler.reconcile(&key("m1")).await.unwrap();
        let first = stored(&store, "m1");
        let outcome = reconciler.reconcile(&key("m1")).await.unwrap();
        let second = stored(&store, "m1");

        assert_eq!(outcome, ReconcileOutcome::Done);
        assert_eq!(first.status, second.status);
        assert_eq!(first.metadata.resource_version, second.metadata.resource_version);
        assert_eq!(store.status_writes(), 2);
    }

    #[tokio::test]
    async fn test_observed_generation_follows_spec_changes() {
        let (store, inventory) = scenario();
        let reconciler = create_test_reconciler(Arc::clone(&store), inventory);

        reconciler.reconcile(&key("m1")).await.unwrap();
        assert_eq!(stored(&store, "m1").status.unwrap().observed_generation, Some(3));

        let mut migration = stored(&store, "m1");
        migration.metadata.generation = Some(4);
        store.add_migration(migration);
        reconciler.reconcile(&key("m1")).await.unwrap();

        let status = stored(&store, "m1").status.unwrap();
        assert_eq!(status.observed_generation, Some(4));
        assert!(status.is_ready());
    }

    #[tokio::test]
    async fn test_missing_plan_blocks_until_created() {
        let (store, inventory) = scenario();
        store.add_migration(create_test_migration("m2", NAMESPACE, "later", 1));
        let reconciler = create_test_reconciler(Arc::clone(&store), inventory);

        let outcome = reconciler.reconcile(&key("m2")).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::Requeue);
        let migration = stored(&store, "m2");
        let status = migration.status.as_ref().unwrap();
        assert!(!status.is_ready());
        assert_eq!(condition_types(&migration), vec!["PlanNotFound".to_string()]);
        assert_eq!(status.observed_generation, Some(1));

        store.add_plan(create_test_plan("later", NAMESPACE, "vcenter", &["vm-1"]));
        let outcome = reconciler.reconcile(&key("m2")).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::Done);
        assert_eq!(condition_types(&stored(&store, "m2")), vec![READY.to_string()]);
    }

    #[tokio::test]
    async fn test_unsupported_provider_blocks() {
        let (store, inventory) = scenario();
        let mut provider = create_test_provider("vcenter", NAMESPACE, "uid-1");
        provider.spec.r#type = ProviderType::Openshift;
        store.add_provider(provider);
        let reconciler = create_test_reconciler(Arc::clone(&store), inventory);

        let outcome = reconciler.reconcile(&key("m1")).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::Requeue);
        assert_eq!(condition_types(&stored(&store, "m1")), vec!["ProviderNotValid".to_string()]);
    }

    #[tokio::test]
    async fn test_rejected_vm_blocks() {
        let (store, inventory) = scenario();
        inventory.reject_vm("vm-1", StatusCode::NOT_FOUND);
        let reconciler = create_test_reconciler(Arc::clone(&store), inventory);

        reconciler.reconcile(&key("m1")).await.unwrap();

        let migration = stored(&store, "m1");
        let condition = migration.status.as_ref().unwrap().find_condition("VMNotFound").unwrap().clone();
        assert!(condition.is_blocker());
        assert!(condition.message.unwrap().contains("vm-1"));
    }

    #[tokio::test]
    async fn test_host_without_secret_blocks() {
        let store = Arc::new(MemoryStore::new());
        store.add_migration(create_test_migration("m1", NAMESPACE, "plan", 1));
        store.add_plan(create_test_plan("plan", NAMESPACE, "vcenter", &["vm-1"]));
        store.add_provider(create_test_provider("vcenter", NAMESPACE, "uid-1"));
        store.add_host(create_test_host("esx-1", NAMESPACE, HOST_ID, "vcenter", ""));
        let inventory = MockInventoryClient::new("http://inventory");
        inventory.add_vm(create_test_vm("vm-1", HOST_ID, &[]));
        let reconciler = create_test_reconciler(Arc::clone(&store), inventory);

        reconciler.reconcile(&key("m1")).await.unwrap();

        assert_eq!(condition_types(&stored(&store, "m1")), vec!["HostNotValid".to_string()]);
    }

    #[tokio::test]
    async fn test_conflict_requeues_and_recovers() {
        let (store, inventory) = scenario();
        let reconciler = create_test_reconciler(Arc::clone(&store), inventory);
        store.inject_conflict();

        let outcome = reconciler.reconcile(&key("m1")).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::Requeue);
        assert!(stored(&store, "m1").status.is_none());
        assert_eq!(store.status_writes(), 0);

        let outcome = reconciler.reconcile(&key("m1")).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::Done);
        assert!(stored(&store, "m1").status.unwrap().is_ready());
    }

    #[tokio::test]
    async fn test_store_failure_is_error() {
        let (store, inventory) = scenario();
        let reconciler = create_test_reconciler(Arc::clone(&store), inventory);
        store.set_unavailable(true);

        let err = reconciler.reconcile(&key("m1")).await.unwrap_err();

        assert!(matches!(err, ControllerError::Store(StoreError::Backend(_))));
    }

    #[tokio::test]
    async fn test_inventory_failure_is_error_without_status_write() {
        let (store, inventory) = scenario();
        inventory.set_unreachable(&vsphere::Vm::path("vm-1"));
        let reconciler = create_test_reconciler(Arc::clone(&store), inventory);

        let err = reconciler.reconcile(&key("m1")).await.unwrap_err();

        assert!(matches!(err, ControllerError::Builder(BuilderError::Lookup { .. })));
        assert_eq!(store.status_writes(), 0);
        assert!(stored(&store, "m1").status.is_none());
    }

    #[tokio::test]
    async fn test_distinct_migrations_reconcile_concurrently() {
        let (store, inventory) = scenario();
        store.add_migration(create_test_migration("m2", NAMESPACE, "plan", 7));
        let reconciler = create_test_reconciler(Arc::clone(&store), inventory);

        let (k1, k2) = (key("m1"), key("m2"));
        let (a, b) = tokio::join!(reconciler.reconcile(&k1), reconciler.reconcile(&k2));

        assert_eq!(a.unwrap(), ReconcileOutcome::Done);
        assert_eq!(b.unwrap(), ReconcileOutcome::Done);
        assert_eq!(stored(&store, "m1").status.unwrap().observed_generation, Some(3));
        assert_eq!(stored(&store, "m2").status.unwrap().observed_generation, Some(7));
    }

    #[tokio::test]
    async fn test_plan_vms_resolved_with_bounded_fan_out() {
        let (store, inventory) = scenario();
        let vms: Vec<String> = (0..50).map(|i| format!("vm-{i}")).collect();
        let ids: Vec<&str> = vms.iter().map(String::as_str).collect();
        store.add_plan(create_test_plan("plan", NAMESPACE, "vcenter", &ids));
        for id in &vms {
            inventory.add_vm(create_test_vm(id, HOST_ID, &[]));
        }
        let reconciler = create_test_reconciler(Arc::clone(&store), inventory.clone());

        let outcome = reconciler.reconcile(&key("m1")).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::Done);
        assert!(vms.iter().all(|id| inventory.calls(&vsphere::Vm::path(id)) == 1));
    }

    #[test]
    fn test_backoff_grows_per_key_and_resets() {
        let (store, inventory) = scenario();
        let reconciler = create_test_reconciler(store, inventory);
        let m1 = key("m1");
        let m2 = key("m2");

        let delays: Vec<u64> = (0..6).map(|_| reconciler.next_backoff(&m1).0.as_secs()).collect();
        assert_eq!(delays, vec![1, 1, 2, 3, 5, 8]);
        assert_eq!(reconciler.next_backoff(&m2), (Duration::from_secs(1), 1));

        reconciler.reset_backoff(&m1);
        assert_eq!(reconciler.next_backoff(&m1), (Duration::from_secs(1), 1));
    }
}
