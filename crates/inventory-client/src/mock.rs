//! Mock InventoryClient for unit testing
//!
//! This module provides a mock implementation of InventoryClientTrait that can be used
//! in unit tests without requiring a running inventory service.

use crate::error::InventoryError;
use crate::inventory_trait::{InventoryClientTrait, InventoryResource, Reply};
use crate::models::vsphere;
use reqwest::StatusCode;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

/// Mock InventoryClient for testing
///
/// Replies are stored by path. Unknown paths answer 404 with no body.
#[derive(Debug, Clone, Default)]
pub struct MockInventoryClient {
    base_url: String,
    replies: Arc<Mutex<HashMap<String, Reply>>>,
    unreachable: Arc<Mutex<HashSet<String>>>,
    calls: Arc<Mutex<HashMap<String, usize>>>,
}

impl MockInventoryClient {
    /// Create a new mock client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the reply for a path (for test setup)
    pub fn set_reply(&self, path: &str, status: StatusCode, body: Option<serde_json::Value>) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_string(), Reply { status, body });
    }

    /// Add a vSphere VM answering 200 (for test setup)
    pub fn add_vm(&self, vm: vsphere::Vm) {
        let body = serde_json::to_value(&vm).unwrap_or(serde_json::Value::Null);
        self.set_reply(&vsphere::Vm::path(&vm.id), StatusCode::OK, Some(body));
    }

    /// Make a VM answer with a non-OK status (for test setup)
    pub fn reject_vm(&self, id: &str, status: StatusCode) {
        self.set_reply(&vsphere::Vm::path(id), status, None);
    }

    /// Make requests for a path fail at the transport level
    pub fn set_unreachable(&self, path: &str) {
        self.unreachable
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_string());
    }

    /// Number of GETs issued for a path
    pub fn calls(&self, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .copied()
            .unwrap_or(0)
    }
}

/// Build a genuine transport error without touching the network.
fn transport_error() -> InventoryError {
    match reqwest::Client::new().get("http://[::1").build() {
        Err(e) => InventoryError::Http(e),
        Ok(_) => InventoryError::Decode {
            path: "mock".to_string(),
            source: serde::de::Error::custom("mock transport failure"),
        },
    }
}

#[async_trait::async_trait]
impl InventoryClientTrait for MockInventoryClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: &str) -> Result<Reply, InventoryError> {
        *self
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(path.to_string())
            .or_default() += 1;

        if self
            .unreachable
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(path)
        {
            return Err(transport_error());
        }

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
            .unwrap_or(Reply {
                status: StatusCode::NOT_FOUND,
                body: None,
            });
        Ok(reply)
    }
}
