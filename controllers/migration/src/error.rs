//! Controller-specific error types.

use crate::store::StoreError;
use provider_builder::BuilderError;
use thiserror::Error;

/// Errors that can occur in the Migration Controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Object store error
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Builder or inventory error while resolving references
    #[error("builder error: {0}")]
    Builder(#[from] BuilderError),

    /// Kubernetes client error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}
