//! Self profile and handle counter persistence.
//!
//! The profile is a versioned JSON document. Profiles written before
//! versioning carry no `version` field and are read as `1.0.0`. The handle
//! counter is a bare decimal string under its own key.

use std::sync::Arc;

use async_trait::async_trait;
use version_migrate::Migrator;

use charisma_core::error::{CharismaError, Result};
use charisma_core::identity::{IdentityRepository, SelfProfile};
use charisma_core::storage::KeyValueStore;

use crate::dto::create_self_profile_migrator;
use crate::storage::VersionedDocument;

const LEGACY_PROFILE_VERSION: &str = "1.0.0";

pub struct KvIdentityRepository {
    store: Arc<dyn KeyValueStore>,
    profile: VersionedDocument,
    counter_key: String,
    migrator: Migrator,
}

impl KvIdentityRepository {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        profile_key: impl Into<String>,
        counter_key: impl Into<String>,
    ) -> Self {
        Self {
            profile: VersionedDocument::new(store.clone(), profile_key),
            store,
            counter_key: counter_key.into(),
            migrator: create_self_profile_migrator(),
        }
    }

    async fn read_counter(&self) -> Result<u64> {
        let Some(raw) = self.store.get(&self.counter_key).await? else {
            return Ok(0);
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(0);
        }
        trimmed
            .parse::<u64>()
            .map_err(|e| CharismaError::Serialization {
                format: "counter".to_string(),
                message: format!("Invalid handle counter '{}': {}", trimmed, e),
            })
    }
}

#[async_trait]
impl IdentityRepository for KvIdentityRepository {
    async fn load_profile(&self) -> Result<Option<SelfProfile>> {
        let Some(value) = self.profile.load_tagged(LEGACY_PROFILE_VERSION, None).await? else {
            return Ok(None);
        };

        let profile: SelfProfile = self.migrator.load_flat_from("self_profile", value)?;

        Ok(Some(profile))
    }

    async fn save_profile(&self, profile: &SelfProfile) -> Result<()> {
        let serialized = self.migrator.save_domain_flat("self_profile", profile.clone())?;
        self.profile.save_json(serialized).await
    }

    async fn next_handle_number(&self) -> Result<u64> {
        let next = self.read_counter().await? + 1;
        self.store.set(&self.counter_key, next.to_string()).await?;
        tracing::debug!("Handle counter advanced to {}", next);
        Ok(next)
    }
}
