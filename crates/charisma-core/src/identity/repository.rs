//! Identity repository trait.

use async_trait::async_trait;

use super::model::SelfProfile;
use crate::error::Result;

/// Persistence contract for the self profile and the handle counter.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Loads the self profile, migrating legacy shapes.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(profile))`: an identity exists
    /// - `Ok(None)`: no identity has been allocated yet
    /// - `Err(_)`: storage could not be read
    async fn load_profile(&self) -> Result<Option<SelfProfile>>;

    /// Replaces the stored self profile.
    async fn save_profile(&self, profile: &SelfProfile) -> Result<()>;

    /// Increments the persisted handle counter and returns the new value.
    ///
    /// The increment is persisted before returning; a value handed out here
    /// is never handed out again, even if the caller later fails.
    async fn next_handle_number(&self) -> Result<u64>;
}
