//! Party directory repository backed by a key-value store.

use std::sync::Arc;

use async_trait::async_trait;
use version_migrate::Migrator;

use charisma_core::error::Result;
use charisma_core::party::{PartyDirectory, PartyRepository};
use charisma_core::storage::KeyValueStore;

use crate::dto::create_directory_migrator;
use crate::storage::VersionedDocument;

/// Version of directories written as a bare array of registered users.
const LEGACY_DIRECTORY_VERSION: &str = "1.0.0";

pub struct KvPartyRepository {
    document: VersionedDocument,
    migrator: Migrator,
}

impl KvPartyRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            document: VersionedDocument::new(store, key),
            migrator: create_directory_migrator(),
        }
    }
}

#[async_trait]
impl PartyRepository for KvPartyRepository {
    async fn load(&self) -> Result<Option<PartyDirectory>> {
        let Some(value) = self
            .document
            .load_tagged(LEGACY_DIRECTORY_VERSION, Some("parties"))
            .await?
        else {
            return Ok(None);
        };

        let directory: PartyDirectory = self.migrator.load_flat_from("directory", value)?;

        Ok(Some(directory))
    }

    async fn save(&self, directory: &PartyDirectory) -> Result<()> {
        let serialized = self.migrator.save_domain_flat("directory", directory.clone())?;
        self.document.save_json(serialized).await
    }
}
