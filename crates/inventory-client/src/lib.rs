//! Provider Inventory REST API Client
//!
//! A Rust client library for the provider inventory service. The inventory
//! answers point queries ("describe VM by ID") with an HTTP status code and
//! a provider-specific descriptor.
//!
//! # Example
//!
//! ```no_run
//! use inventory_client::{get_into, InventoryClient, ProviderPath, vsphere};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = InventoryClient::new(
//!     "http://inventory:8080".to_string(),
//!     ProviderPath::new("vsphere", "b9c5f1e0"),
//!     None,
//! )?;
//!
//! let mut vm = vsphere::Vm::default();
//! let status = get_into(&client, &mut vm, "vm-42").await?;
//! if status.is_success() {
//!     println!("VM {} has {} disks", vm.id, vm.disks.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod inventory_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::{InventoryClient, ProviderPath};
pub use error::InventoryError;
pub use inventory_trait::{get_into, InventoryClientTrait, InventoryResource, Reply};
pub use models::vsphere;
pub use reqwest::StatusCode;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockInventoryClient;
