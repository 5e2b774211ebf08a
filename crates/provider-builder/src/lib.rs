//! Provider Builders
//!
//! A builder translates a hypervisor-specific VM description from the
//! provider inventory into provider-agnostic import artifacts:
//!
//! - the migration credential Secret payload
//! - the network/datastore `ResourceMapping`
//! - the `ImportSourceSpec`
//! - the ordered list of migration tasks with progress totals
//!
//! Every operation is stateless and idempotent. Builders never cache
//! inventory data and never mutate the shared host map, so any subset of
//! operations may be invoked in any order, concurrently across VMs.
//!
//! Builders are selected through a [`Registry`] keyed by provider type.

pub mod builder;
pub mod error;
pub mod host;
pub mod secret;
pub mod vsphere;

pub use builder::{Builder, BuilderContext, BuilderFactory, InventoryConnector, Registry};
pub use error::BuilderError;
pub use host::{HostMap, HostResolution};
pub use secret::{KubeSecretLookup, SecretLookup, SecretLookupError};
#[cfg(any(test, feature = "test-util"))]
pub use secret::MemorySecretLookup;
