//! Resolution of the durable self identity.

use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use charisma_core::Timestamp;
use charisma_core::config::EngineConfig;
use charisma_core::error::{CharismaError, Result};
use charisma_core::identity::{IdentityRepository, SelfProfile, format_handle};

/// Resolves, allocates and caches the self profile of an installation.
///
/// Resolution is serialized through an internal lock, so concurrent callers
/// never allocate two identities.
pub struct IdentityResolver {
    repository: Arc<dyn IdentityRepository>,
    handle_prefix: String,
    handle_width: usize,
    default_display_name: String,
    cached: Mutex<Option<SelfProfile>>,
}

impl IdentityResolver {
    pub fn new(repository: Arc<dyn IdentityRepository>, config: &EngineConfig) -> Self {
        Self {
            repository,
            handle_prefix: config.handle_prefix.clone(),
            handle_width: config.handle_width,
            default_display_name: config.default_display_name.clone(),
            cached: Mutex::new(None),
        }
    }

    /// Returns the self profile, allocating one on first use.
    ///
    /// The handle counter is persisted before the profile. If saving the
    /// profile fails the counter value is burnt, never reused.
    pub async fn resolve_self(&self, now: Timestamp) -> Result<SelfProfile> {
        let mut cached = self.cached.lock().await;
        if let Some(profile) = cached.as_ref() {
            return Ok(profile.clone());
        }

        let profile = self.load_or_allocate(now).await?;
        *cached = Some(profile.clone());
        Ok(profile)
    }

    /// Changes the display name, keeping id and handle.
    pub async fn update_display_name(
        &self,
        display_name: &str,
        now: Timestamp,
    ) -> Result<SelfProfile> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(CharismaError::InvalidParty(
                "display name must not be empty".to_string(),
            ));
        }

        let mut cached = self.cached.lock().await;
        let mut profile = match cached.as_ref() {
            Some(profile) => profile.clone(),
            None => self.load_or_allocate(now).await?,
        };

        profile.display_name = display_name.to_string();
        self.repository.save_profile(&profile).await?;
        tracing::debug!("Updated display name of {}", profile.id);

        *cached = Some(profile.clone());
        Ok(profile)
    }

    async fn load_or_allocate(&self, now: Timestamp) -> Result<SelfProfile> {
        match self.repository.load_profile().await? {
            Some(profile) if profile.has_handle() => Ok(profile),
            Some(mut profile) => {
                profile.handle = self.allocate_handle().await?;
                self.repository.save_profile(&profile).await?;
                tracing::info!(
                    "Allocated handle {} for existing profile {}",
                    profile.handle,
                    profile.id
                );
                Ok(profile)
            }
            None => {
                let handle = self.allocate_handle().await?;
                let profile = SelfProfile {
                    id: Uuid::new_v4().to_string(),
                    handle,
                    display_name: self.default_display_name.clone(),
                    joined_at: now,
                };
                self.repository.save_profile(&profile).await?;
                tracing::info!("Allocated identity {} ({})", profile.id, profile.handle);
                Ok(profile)
            }
        }
    }

    async fn allocate_handle(&self) -> Result<String> {
        let number = self.repository.next_handle_number().await?;
        Ok(format_handle(&self.handle_prefix, number, self.handle_width))
    }
}
