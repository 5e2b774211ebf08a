//! InventoryClient trait for mocking
//!
//! This trait abstracts the inventory client to enable mocking in unit tests.
//! The concrete InventoryClient implements this trait, and tests can use mock implementations.

use crate::error::InventoryError;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

/// Raw inventory reply
#[derive(Debug, Clone)]
pub struct Reply {
    /// HTTP status returned by the inventory
    pub status: StatusCode,
    /// JSON body, when the inventory returned one
    pub body: Option<serde_json::Value>,
}

/// Trait for inventory API client operations
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait InventoryClientTrait: Send + Sync {
    /// Get the base URL
    fn base_url(&self) -> &str;

    /// Perform a single GET for a path relative to the provider root.
    ///
    /// Only transport failures are errors; any HTTP status is returned in the reply.
    async fn get(&self, path: &str) -> Result<Reply, InventoryError>;
}

/// A typed inventory resource addressable by ID
pub trait InventoryResource: DeserializeOwned {
    /// Path of the resource relative to the provider root.
    ///
    /// The ID is percent-encoded as a single path segment.
    fn path(id: &str) -> String;
}

/// Fetch the resource with `id` into `dest`.
///
/// Returns the HTTP status. `dest` is only populated on 200; any other
/// status is a remote rejection the caller must render.
pub async fn get_into<C, T>(client: &C, dest: &mut T, id: &str) -> Result<StatusCode, InventoryError>
where
    C: InventoryClientTrait + ?Sized,
    T: InventoryResource + Send,
{
    let path = T::path(id);
    let reply = client.get(&path).await?;
    if reply.status == StatusCode::OK {
        let body = reply.body.unwrap_or(serde_json::Value::Null);
        *dest = serde_json::from_value(body)
            .map_err(|source| InventoryError::Decode { path, source })?;
    }
    Ok(reply.status)
}
