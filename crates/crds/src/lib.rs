//! Virt Controller CRD Definitions
//!
//! Kubernetes Custom Resource Definitions used by the migration controller
//! and the provider builders, plus the task and import artifact types the
//! builders produce.

pub mod conditions;
pub mod host;
pub mod migration;
pub mod plan;
pub mod provider;
pub mod references;
pub mod task;
pub mod vmio;

pub use conditions::*;
pub use host::*;
pub use migration::*;
pub use plan::*;
pub use provider::*;
pub use references::*;
pub use task::*;
pub use vmio::*;
