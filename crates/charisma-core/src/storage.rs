//! Key-value storage contract.
//!
//! The engine persists everything through this interface: opaque string keys
//! holding serialized documents. Implementations must provide
//! read-your-writes consistency within one installation.

use async_trait::async_trait;

use crate::error::Result;

/// Async get/set/remove over opaque string keys.
///
/// Failures to reach the backing medium are reported as
/// `CharismaError::StorageUnavailable`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}
