//! The conversation index engine.
//!
//! `ConversationIndex` owns the message log and its conversation projection
//! and is the only writer of both. Every operation runs under one lock, so
//! operations never interleave. A mutation is computed on copies of the
//! in-memory state, persisted (log first, projection second) and only then
//! made visible.
//!
//! # Recovery
//!
//! The stored projection records the log revision it reflects. When it is
//! missing, behind or ahead of the log, or (with `verify_on_open`) differs
//! from a full rebuild, [`ConversationIndex::open`] rebuilds it from the log
//! and persists the result.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;

use charisma_core::config::EngineConfig;
use charisma_core::conversation::{
    ConversationProjection, ConversationRepository, ConversationView, read_state,
};
use charisma_core::error::Result;
use charisma_core::identity::SelfProfile;
use charisma_core::message::{Message, MessageLog, MessageRepository};
use charisma_core::party::Party;
use charisma_core::storage::KeyValueStore;
use charisma_core::{MessageId, Timestamp};
use charisma_infrastructure::{
    KvConversationRepository, KvIdentityRepository, KvMessageRepository, KvPartyRepository,
};

use crate::clock::{Clock, SystemClock};
use crate::directory_service::DirectoryService;
use crate::identity_resolver::IdentityResolver;

/// In-memory copy of the two persisted documents.
struct IndexState {
    log: MessageLog,
    projection: ConversationProjection,
}

pub struct ConversationIndex {
    clock: Arc<dyn Clock>,
    identity: IdentityResolver,
    directory: DirectoryService,
    messages: Arc<dyn MessageRepository>,
    conversations: Arc<dyn ConversationRepository>,
    state: Mutex<IndexState>,
}

impl ConversationIndex {
    /// Opens the index over `store` using the wall clock.
    pub async fn open(store: Arc<dyn KeyValueStore>, config: EngineConfig) -> Result<Self> {
        Self::open_with_clock(store, config, Arc::new(SystemClock)).await
    }

    pub async fn open_with_clock(
        store: Arc<dyn KeyValueStore>,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let keys = &config.keys;
        let identity_repository = Arc::new(KvIdentityRepository::new(
            store.clone(),
            keys.profile.clone(),
            keys.handle_counter.clone(),
        ));
        let party_repository = Arc::new(KvPartyRepository::new(store.clone(), keys.parties.clone()));
        let messages: Arc<dyn MessageRepository> =
            Arc::new(KvMessageRepository::new(store.clone(), keys.messages.clone()));
        let conversations: Arc<dyn ConversationRepository> =
            Arc::new(KvConversationRepository::new(store, keys.conversations.clone()));

        let log = messages.load_log().await?;
        let projection =
            Self::recover_projection(&log, conversations.as_ref(), config.verify_on_open).await?;

        tracing::info!(
            "Conversation index opened: {} messages, {} views, revision {}",
            log.len(),
            projection.len(),
            log.revision()
        );

        Ok(Self {
            clock,
            identity: IdentityResolver::new(identity_repository, &config),
            directory: DirectoryService::new(party_repository, config.seed_parties.clone()),
            messages,
            conversations,
            state: Mutex::new(IndexState { log, projection }),
        })
    }

    async fn recover_projection(
        log: &MessageLog,
        conversations: &dyn ConversationRepository,
        verify: bool,
    ) -> Result<ConversationProjection> {
        let stored = match conversations.load_projection().await {
            Ok(stored) => stored,
            Err(e) if e.is_storage_unavailable() => return Err(e),
            Err(e) => {
                tracing::warn!("Stored projection is unreadable: {}", e);
                return Ok(Self::persist_rebuilt(log, conversations).await);
            }
        };
        let reason = match &stored {
            None if log.is_empty() => return Ok(ConversationProjection::rebuild(log)),
            None => "projection missing".to_string(),
            Some(projection) if projection.log_revision() != log.revision() => format!(
                "projection reflects revision {}, log is at {}",
                projection.log_revision(),
                log.revision()
            ),
            Some(projection) => match projection.verify(log) {
                Err(e) if verify => e.to_string(),
                _ => return Ok(projection.clone()),
            },
        };

        tracing::warn!("Rebuilding conversation projection: {}", reason);
        Ok(Self::persist_rebuilt(log, conversations).await)
    }

    async fn persist_rebuilt(
        log: &MessageLog,
        conversations: &dyn ConversationRepository,
    ) -> ConversationProjection {
        let rebuilt = ConversationProjection::rebuild(log);
        if let Err(e) = conversations.save_projection(&rebuilt).await {
            tracing::warn!("Failed to persist rebuilt projection: {}", e);
        }
        rebuilt
    }

    /// Persists a new log and projection, then swaps them into `state`.
    ///
    /// If the projection write fails the previous log is written back. When
    /// that also fails the stored projection trails the log and is rebuilt on
    /// the next open.
    async fn commit(
        &self,
        state: &mut IndexState,
        log: MessageLog,
        mut projection: ConversationProjection,
    ) -> Result<()> {
        projection.sync_revision(log.revision());

        self.messages.save_log(&log).await?;
        if let Err(e) = self.conversations.save_projection(&projection).await {
            tracing::warn!(
                "Projection write failed at revision {}, restoring message log: {}",
                log.revision(),
                e
            );
            if let Err(restore) = self.messages.save_log(&state.log).await {
                tracing::error!(
                    "Failed to restore message log to revision {}: {}",
                    state.log.revision(),
                    restore
                );
            }
            return Err(e);
        }

        state.log = log;
        state.projection = projection;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Identity and directory
    // ------------------------------------------------------------------

    /// Returns the durable self identity and registers it in the directory
    /// as online.
    pub async fn resolve_self(&self) -> Result<Party> {
        let now = self.clock.now();
        let profile = self.identity.resolve_self(now).await?;
        let party = profile.to_party(now);
        self.directory.upsert_party(party.clone()).await?;
        Ok(party)
    }

    /// The full self profile, allocating it if needed.
    pub async fn self_profile(&self) -> Result<SelfProfile> {
        self.identity.resolve_self(self.clock.now()).await
    }

    /// Renames self and propagates the change to the directory.
    pub async fn update_self_profile(&self, display_name: &str) -> Result<SelfProfile> {
        let now = self.clock.now();
        let profile = self.identity.update_display_name(display_name, now).await?;
        self.directory.upsert_party(profile.to_party(now)).await?;
        Ok(profile)
    }

    pub async fn list_known_parties(&self) -> Result<Vec<Party>> {
        self.directory.list_known_parties().await
    }

    pub async fn get_party(&self, id: &str) -> Result<Option<Party>> {
        self.directory.get_party(id).await
    }

    pub async fn upsert_party(&self, party: Party) -> Result<()> {
        self.directory.upsert_party(party).await
    }

    pub async fn hide_party(&self, id: &str) -> Result<()> {
        self.directory.hide_party(id).await
    }

    // ------------------------------------------------------------------
    // Message log
    // ------------------------------------------------------------------

    /// Appends a message stamped with the engine clock.
    pub async fn append(&self, from_party: &str, to_party: &str, body: &str) -> Result<Message> {
        let now = self.clock.now();
        self.append_at(from_party, to_party, body, now).await
    }

    /// Appends a message at an explicit time. The stored timestamp is never
    /// earlier than the latest message already in the log.
    ///
    /// Endpoints missing from the directory are registered once the message
    /// is stored; a failure to do so is logged and does not undo the append.
    pub async fn append_at(
        &self,
        from_party: &str,
        to_party: &str,
        body: &str,
        now: Timestamp,
    ) -> Result<Message> {
        let mut state = self.state.lock().await;

        let mut log = state.log.clone();
        let message = log.append(from_party, to_party, body, now)?;
        let mut projection = state.projection.clone();
        projection.apply(&message);

        self.commit(&mut state, log, projection).await?;
        drop(state);
        tracing::debug!(
            "Appended {} from {} to {}",
            message.id,
            message.from_party,
            message.to_party
        );

        if let Err(e) = self
            .directory
            .observe(&[message.from_party.as_str(), message.to_party.as_str()])
            .await
        {
            tracing::warn!("Failed to register parties of {}: {}", message.id, e);
        }
        Ok(message)
    }

    /// Sends `body` from self to `to_party`.
    pub async fn send(&self, to_party: &str, body: &str) -> Result<Message> {
        let me = self.resolve_self().await?;
        self.append(&me.id, to_party, body).await
    }

    /// Full history between two parties, oldest first.
    pub async fn list_between(&self, a: &str, b: &str) -> Vec<Message> {
        self.state.lock().await.log.list_between(a, b)
    }

    /// Deletes every message between two parties and both parties' views of
    /// the conversation. Returns the number of messages removed.
    pub async fn delete_between(&self, a: &str, b: &str) -> Result<usize> {
        let mut state = self.state.lock().await;

        let mut log = state.log.clone();
        let removed = log.delete_between(a, b);
        if removed == 0 {
            return Ok(0);
        }
        let mut projection = state.projection.clone();
        projection.on_conversation_deleted(a, b);
        projection.on_conversation_deleted(b, a);

        self.commit(&mut state, log, projection).await?;
        tracing::debug!("Deleted {} messages between {} and {}", removed, a, b);
        Ok(removed)
    }

    /// Deletes the conversation between `self_id` and `counterparty`.
    pub async fn delete_conversation(&self, self_id: &str, counterparty: &str) -> Result<usize> {
        self.delete_between(self_id, counterparty).await
    }

    // ------------------------------------------------------------------
    // Projection and read state
    // ------------------------------------------------------------------

    pub async fn list_conversations(&self, self_id: &str) -> Vec<ConversationView> {
        self.state.lock().await.projection.list(self_id)
    }

    pub async fn conversation(&self, self_id: &str, counterparty: &str) -> Option<ConversationView> {
        self.state
            .lock()
            .await
            .projection
            .get(self_id, counterparty)
            .cloned()
    }

    pub async fn total_unread(&self, self_id: &str) -> u32 {
        self.state.lock().await.projection.total_unread(self_id)
    }

    /// Acknowledges the given messages. Unknown or already read ids are
    /// ignored. Returns how many messages changed state.
    pub async fn mark_read(&self, message_ids: &HashSet<MessageId>) -> Result<usize> {
        let mut state = self.state.lock().await;

        let mut log = state.log.clone();
        let mut projection = state.projection.clone();
        let changed = read_state::mark_read(&mut log, &mut projection, message_ids);
        if changed.is_empty() {
            return Ok(0);
        }

        self.commit(&mut state, log, projection).await?;
        tracing::debug!("Marked {} messages read", changed.len());
        Ok(changed.len())
    }

    /// Acknowledges everything `counterparty` sent to `self_id`.
    pub async fn mark_conversation_read(&self, self_id: &str, counterparty: &str) -> Result<usize> {
        let mut state = self.state.lock().await;
        self.drain_unread(&mut state, self_id, counterparty).await
    }

    /// Marks the conversation read and returns its history.
    pub async fn open_conversation(
        &self,
        self_id: &str,
        counterparty: &str,
    ) -> Result<Vec<Message>> {
        let mut state = self.state.lock().await;
        self.drain_unread(&mut state, self_id, counterparty).await?;
        Ok(state.log.list_between(self_id, counterparty))
    }

    async fn drain_unread(
        &self,
        state: &mut IndexState,
        self_id: &str,
        counterparty: &str,
    ) -> Result<usize> {
        let mut log = state.log.clone();
        let mut projection = state.projection.clone();
        let changed =
            read_state::mark_conversation_read(&mut log, &mut projection, self_id, counterparty);
        if changed.is_empty() && projection == state.projection {
            return Ok(0);
        }

        self.commit(state, log, projection).await?;
        tracing::debug!(
            "Marked conversation {} -> {} read ({} messages)",
            counterparty,
            self_id,
            changed.len()
        );
        Ok(changed.len())
    }

    // ------------------------------------------------------------------
    // Recovery
    // ------------------------------------------------------------------

    /// Recomputes the projection from the log and persists it.
    pub async fn rebuild_projection(&self) -> Result<()> {
        let mut state = self.state.lock().await;

        let projection = ConversationProjection::rebuild(&state.log);
        self.conversations.save_projection(&projection).await?;
        tracing::info!(
            "Rebuilt conversation projection: {} views at revision {}",
            projection.len(),
            projection.log_revision()
        );

        state.projection = projection;
        Ok(())
    }

    /// Checks both the in-memory and the stored projection against a full
    /// rebuild from the log. Returns false on any divergence.
    pub async fn verify_projection(&self) -> Result<bool> {
        let state = self.state.lock().await;

        if let Err(e) = state.projection.verify(&state.log) {
            tracing::warn!("In-memory projection diverges from log: {}", e);
            return Ok(false);
        }

        let stored = self.conversations.load_projection().await?;
        match stored {
            Some(stored) if stored == state.projection => Ok(true),
            Some(stored) => {
                tracing::warn!(
                    "Stored projection at revision {} differs from memory at revision {}",
                    stored.log_revision(),
                    state.projection.log_revision()
                );
                Ok(false)
            }
            None if state.log.is_empty() => Ok(true),
            None => {
                tracing::warn!("Stored projection missing");
                Ok(false)
            }
        }
    }
}
