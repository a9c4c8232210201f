//! Conversation projection repository backed by a key-value store.

use std::sync::Arc;

use async_trait::async_trait;
use version_migrate::Migrator;

use charisma_core::conversation::{ConversationProjection, ConversationRepository, ProjectionSnapshot};
use charisma_core::error::Result;
use charisma_core::storage::KeyValueStore;

use crate::dto::create_conversation_projection_migrator;
use crate::storage::VersionedDocument;

pub struct KvConversationRepository {
    document: VersionedDocument,
    migrator: Migrator,
}

impl KvConversationRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            document: VersionedDocument::new(store, key),
            migrator: create_conversation_projection_migrator(),
        }
    }
}

#[async_trait]
impl ConversationRepository for KvConversationRepository {
    async fn load_projection(&self) -> Result<Option<ConversationProjection>> {
        let Some(value) = self.document.load_value().await? else {
            return Ok(None);
        };

        let snapshot: ProjectionSnapshot =
            self.migrator.load_flat_from("conversation_projection", value)?;

        Ok(Some(ConversationProjection::from_snapshot(snapshot)))
    }

    async fn save_projection(&self, projection: &ConversationProjection) -> Result<()> {
        let serialized = self
            .migrator
            .save_domain_flat("conversation_projection", projection.to_snapshot())?;
        self.document.save_json(serialized).await
    }
}
