//! Test utilities for unit testing the reconciler
//!
//! This module provides helpers for creating test data and an in-memory
//! object store that enforces resource versions like the API server does.

use crate::reconciler::Reconciler;
use crate::store::{MigrationStore, ResourceKey, StoreError};
use crds::*;
use inventory_client::{vsphere, MockInventoryClient};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;
use provider_builder::{MemorySecretLookup, Registry};
use settings::Settings;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Namespace used by the fixtures
pub const NAMESPACE: &str = "konveyor";

fn meta(name: &str, namespace: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        ..Default::default()
    }
}

/// Helper to create test Migration CRD
pub fn create_test_migration(name: &str, namespace: &str, plan: &str, generation: i64) -> Migration {
    let mut migration = Migration::new(
        name,
        MigrationSpec {
            plan: ObjectReference::new(plan),
        },
    );
    migration.metadata = ObjectMeta {
        generation: Some(generation),
        ..meta(name, namespace)
    };
    migration
}

/// Helper to create test Plan CRD with two networks and one datastore
pub fn create_test_plan(name: &str, namespace: &str, provider: &str, vms: &[&str]) -> Plan {
    let mut plan = Plan::new(
        name,
        PlanSpec {
            provider: PlanProvider {
                source: ObjectReference::new(provider),
                destination: None,
            },
            map: Map {
                networks: vec![
                    NetworkPair {
                        source: SourceRef { id: "net-1".to_string() },
                        destination: DestinationNetwork {
                            namespace: namespace.to_string(),
                            name: "pod-a".to_string(),
                        },
                    },
                    NetworkPair {
                        source: SourceRef { id: "net-2".to_string() },
                        destination: DestinationNetwork {
                            namespace: namespace.to_string(),
                            name: "pod-b".to_string(),
                        },
                    },
                ],
                datastores: vec![StoragePair {
                    source: SourceRef { id: "ds-1".to_string() },
                    destination: DestinationStorage {
                        storage_class: "standard".to_string(),
                    },
                }],
            },
            vms: vms.iter().map(|id| PlanVm { id: (*id).to_string() }).collect(),
        },
    );
    plan.metadata = meta(name, namespace);
    plan
}

/// Helper to create test vSphere Provider CRD
pub fn create_test_provider(name: &str, namespace: &str, uid: &str) -> Provider {
    let mut provider = Provider::new(
        name,
        ProviderSpec {
            r#type: ProviderType::Vsphere,
            url: "https://vcenter.example.com/sdk".to_string(),
            secret: None,
        },
    );
    provider.metadata = ObjectMeta {
        uid: Some(uid.to_string()),
        ..meta(name, namespace)
    };
    provider
}

/// Helper to create test Host CRD
pub fn create_test_host(name: &str, namespace: &str, host_id: &str, provider: &str, secret: &str) -> Host {
    let mut host = Host::new(
        name,
        HostSpec {
            id: host_id.to_string(),
            provider: ObjectReference::new(provider),
            ip_address: None,
            secret: SecretRef::new(secret, namespace),
        },
    );
    host.metadata = meta(name, namespace);
    host
}

/// Helper to create an inventory VM
pub fn create_test_vm(id: &str, host_id: &str, capacities: &[i64]) -> vsphere::Vm {
    vsphere::Vm {
        id: id.to_string(),
        name: id.to_string(),
        uuid: format!("uuid-{id}"),
        host: vsphere::Ref {
            kind: "Host".to_string(),
            id: host_id.to_string(),
        },
        disks: capacities
            .iter()
            .enumerate()
            .map(|(i, capacity)| vsphere::Disk {
                file: format!("[ds-1] {id}/disk-{i}.vmdk"),
                capacity: *capacity,
                ..Default::default()
            })
            .collect(),
    }
}

/// Helper to create a reconciler over an in-memory store and a mock inventory
pub fn create_test_reconciler(store: Arc<MemoryStore>, inventory: MockInventoryClient) -> Reconciler {
    Reconciler::new(
        store,
        Registry::default(),
        Arc::new(inventory),
        Arc::new(MemorySecretLookup::new()),
        Arc::new(Settings::default()),
    )
}

/// In-memory object store
///
/// Status writes are conditional on the resource version the Migration was
/// read at, and bump the version when the status changes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    migrations: Mutex<HashMap<ResourceKey, Migration>>,
    plans: Mutex<HashMap<ResourceKey, Plan>>,
    providers: Mutex<HashMap<ResourceKey, Provider>>,
    hosts: Mutex<Vec<Host>>,
    status_writes: AtomicUsize,
    unavailable: AtomicBool,
    conflict_once: AtomicBool,
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn bump(version: Option<&str>) -> String {
    let current: u64 = version.and_then(|v| v.parse().ok()).unwrap_or(0);
    (current + 1).to_string()
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a Migration, bumping its resource version
    pub fn add_migration(&self, mut migration: Migration) {
        let key = ResourceKey::of(&migration);
        let mut migrations = lock(&self.migrations);
        let previous = migrations.get(&key).and_then(|m| m.metadata.resource_version.clone());
        migration.metadata.resource_version = Some(bump(previous.as_deref()));
        migrations.insert(key, migration);
    }

    /// Add or replace a Plan
    pub fn add_plan(&self, plan: Plan) {
        lock(&self.plans).insert(ResourceKey::of(&plan), plan);
    }

    /// Add or replace a Provider
    pub fn add_provider(&self, provider: Provider) {
        lock(&self.providers).insert(ResourceKey::of(&provider), provider);
    }

    /// Add a Host
    pub fn add_host(&self, host: Host) {
        lock(&self.hosts).push(host);
    }

    /// Current copy of a Migration
    pub fn migration(&self, key: &ResourceKey) -> Option<Migration> {
        lock(&self.migrations).get(key).cloned()
    }

    /// Let a concurrent writer win the next status write
    pub fn inject_conflict(&self) {
        self.conflict_once.store(true, Ordering::SeqCst);
    }

    /// Make every call fail
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of successful status writes
    pub fn status_writes(&self) -> usize {
        self.status_writes.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl MigrationStore for MemoryStore {
    async fn get_migration(&self, key: &ResourceKey) -> Result<Option<Migration>, StoreError> {
        self.check()?;
        Ok(lock(&self.migrations).get(key).cloned())
    }

    async fn get_plan(&self, key: &ResourceKey) -> Result<Option<Plan>, StoreError> {
        self.check()?;
        Ok(lock(&self.plans).get(key).cloned())
    }

    async fn get_provider(&self, key: &ResourceKey) -> Result<Option<Provider>, StoreError> {
        self.check()?;
        Ok(lock(&self.providers).get(key).cloned())
    }

    async fn list_hosts(&self) -> Result<Vec<Host>, StoreError> {
        self.check()?;
        Ok(lock(&self.hosts).clone())
    }

    async fn update_status(&self, migration: &Migration, status: &MigrationStatus) -> Result<(), StoreError> {
        self.check()?;
        let key = ResourceKey::of(migration);
        let mut migrations = lock(&self.migrations);
        let Some(stored) = migrations.get_mut(&key) else {
            return Err(StoreError::Backend(format!("Migration {key} not found")));
        };
        if self.conflict_once.swap(false, Ordering::SeqCst) {
            stored.metadata.resource_version = Some(bump(stored.metadata.resource_version.as_deref()));
        }
        if stored.resource_version() != migration.resource_version() {
            return Err(StoreError::Conflict(key));
        }
        if stored.status.as_ref() != Some(status) {
            stored.status = Some(status.clone());
            stored.metadata.resource_version = Some(bump(stored.metadata.resource_version.as_deref()));
        }
        self.status_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
