//! Party repository trait.

use async_trait::async_trait;

use super::model::PartyDirectory;
use crate::error::Result;

/// Persistence contract for the party directory.
#[async_trait]
pub trait PartyRepository: Send + Sync {
    /// Loads the directory.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(directory))`: the directory has been written before
    /// - `Ok(None)`: nothing has ever been stored
    /// - `Err(_)`: storage could not be read
    async fn load(&self) -> Result<Option<PartyDirectory>>;

    /// Replaces the stored directory.
    async fn save(&self, directory: &PartyDirectory) -> Result<()>;
}
