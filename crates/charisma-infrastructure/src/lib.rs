//! Persistence for the Charisma conversation index.
//!
//! Documents are stored as versioned JSON through a [`KeyValueStore`], with
//! schema migrations handled by version-migrate at load time.
//!
//! [`KeyValueStore`]: charisma_core::storage::KeyValueStore

pub mod config_service;
pub mod dto;
pub mod kv_conversation_repository;
pub mod kv_identity_repository;
pub mod kv_message_repository;
pub mod kv_party_repository;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::kv_conversation_repository::KvConversationRepository;
pub use crate::kv_identity_repository::KvIdentityRepository;
pub use crate::kv_message_repository::KvMessageRepository;
pub use crate::kv_party_repository::KvPartyRepository;
pub use crate::paths::CharismaPaths;
pub use crate::storage::{FileKeyValueStore, InMemoryKeyValueStore};
