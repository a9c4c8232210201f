//! Message log repository backed by a key-value store.
//!
//! The whole log is a single versioned JSON document under one key.

use std::sync::Arc;

use async_trait::async_trait;
use version_migrate::Migrator;

use charisma_core::error::Result;
use charisma_core::message::{MessageLog, MessageRepository};
use charisma_core::storage::KeyValueStore;

use crate::dto::create_message_log_migrator;
use crate::storage::VersionedDocument;

/// Version of logs written as a bare array of messages.
const LEGACY_LOG_VERSION: &str = "1.0.0";

pub struct KvMessageRepository {
    document: VersionedDocument,
    migrator: Migrator,
}

impl KvMessageRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            document: VersionedDocument::new(store, key),
            migrator: create_message_log_migrator(),
        }
    }
}

#[async_trait]
impl MessageRepository for KvMessageRepository {
    async fn load_log(&self) -> Result<MessageLog> {
        let Some(value) = self
            .document
            .load_tagged(LEGACY_LOG_VERSION, Some("messages"))
            .await?
        else {
            tracing::debug!("No message log under '{}'", self.document.key());
            return Ok(MessageLog::new());
        };

        let log: MessageLog = self.migrator.load_flat_from("message_log", value)?;

        tracing::debug!(
            "Loaded message log: {} messages, revision {}",
            log.len(),
            log.revision()
        );
        Ok(log)
    }

    async fn save_log(&self, log: &MessageLog) -> Result<()> {
        let serialized = self.migrator.save_domain_flat("message_log", log.clone())?;
        self.document.save_json(serialized).await
    }
}
