//! Inventory client errors

use thiserror::Error;

/// Errors that can occur when talking to the inventory service
///
/// A non-OK HTTP status is not an error at this layer: it is returned to
/// the caller, which decides how to render it.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// HTTP transport error (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded into the destination
    #[error("failed to decode {path}: {source}")]
    Decode {
        /// Request path
        path: String,
        /// Underlying decode error
        #[source]
        source: serde_json::Error,
    },

    /// Base URL could not be parsed
    #[error("invalid inventory URL {url}: {reason}")]
    InvalidUrl {
        /// Offending URL
        url: String,
        /// Parser error
        reason: String,
    },
}
