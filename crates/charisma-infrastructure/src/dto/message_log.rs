//! MessageLog DTOs and migrations

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, MigratesTo, Versioned};

use charisma_core::message::{Message, MessageLog, message_id};

/// Message record V1.0.0, as written by the first mobile releases.
///
/// Those releases stored a bare JSON array of these records. Denormalized
/// sender and receiver names are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageV1_0_0 {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(default)]
    pub is_read: bool,
}

/// Message log V1.0.0: messages in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct MessageLogV1_0_0 {
    #[serde(default)]
    pub messages: Vec<MessageV1_0_0>,
}

/// Message record V1.1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageV1_1_0 {
    pub id: String,
    /// Insertion order within the installation.
    pub sequence: u64,
    pub from_party: String,
    pub to_party: String,
    pub body: String,
    pub created_at: i64,
    #[serde(default)]
    pub is_acknowledged: bool,
}

/// Message log V1.1.0 (added sequence numbers and the log revision).
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.1.0")]
pub struct MessageLogV1_1_0 {
    /// Next sequence number to hand out; never decreases.
    pub next_sequence: u64,
    /// Bumped on every mutation of the log.
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub messages: Vec<MessageV1_1_0>,
}

// ============================================================================
// Migration implementations
// ============================================================================

/// Migration from MessageLogV1_0_0 to MessageLogV1_1_0.
///
/// Sequence numbers are assigned by stored position, which was insertion order.
/// Old ids were millisecond timestamps and may repeat; a repeated id is
/// replaced by a freshly built one.
impl MigratesTo<MessageLogV1_1_0> for MessageLogV1_0_0 {
    fn migrate(self) -> MessageLogV1_1_0 {
        let mut seen = HashSet::new();
        let messages: Vec<MessageV1_1_0> = self
            .messages
            .into_iter()
            .enumerate()
            .map(|(position, m)| {
                let sequence = position as u64;
                let id = if seen.insert(m.id.clone()) {
                    m.id
                } else {
                    message_id(m.timestamp, sequence)
                };
                MessageV1_1_0 {
                    id,
                    sequence,
                    from_party: m.sender_id,
                    to_party: m.receiver_id,
                    body: m.content,
                    created_at: m.timestamp,
                    is_acknowledged: m.is_read,
                }
            })
            .collect();

        MessageLogV1_1_0 {
            next_sequence: messages.len() as u64,
            revision: 0,
            messages,
        }
    }
}

// ============================================================================
// Domain model conversions
// ============================================================================

impl From<MessageV1_1_0> for Message {
    fn from(dto: MessageV1_1_0) -> Self {
        Message {
            id: dto.id,
            sequence: dto.sequence,
            from_party: dto.from_party,
            to_party: dto.to_party,
            body: dto.body,
            created_at: dto.created_at,
            is_acknowledged: dto.is_acknowledged,
        }
    }
}

impl From<&Message> for MessageV1_1_0 {
    fn from(message: &Message) -> Self {
        MessageV1_1_0 {
            id: message.id.clone(),
            sequence: message.sequence,
            from_party: message.from_party.clone(),
            to_party: message.to_party.clone(),
            body: message.body.clone(),
            created_at: message.created_at,
            is_acknowledged: message.is_acknowledged,
        }
    }
}

impl IntoDomain<MessageLog> for MessageLogV1_1_0 {
    fn into_domain(self) -> MessageLog {
        MessageLog::from_parts(
            self.messages.into_iter().map(Into::into).collect(),
            self.next_sequence,
            self.revision,
        )
    }
}

impl FromDomain<MessageLog> for MessageLogV1_1_0 {
    fn from_domain(log: MessageLog) -> Self {
        MessageLogV1_1_0 {
            next_sequence: log.next_sequence(),
            revision: log.revision(),
            messages: log.messages().iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates and configures a Migrator instance for the message log.
///
/// # Migration Path
///
/// - V1.0.0 → V1.1.0: Assigns sequence numbers by position
/// - V1.1.0 → MessageLog: Converts DTO to domain model
pub fn create_message_log_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    let log_path = version_migrate::Migrator::define("message_log")
        .from::<MessageLogV1_0_0>()
        .step::<MessageLogV1_1_0>()
        .into_with_save::<MessageLog>();

    migrator
        .register(log_path)
        .expect("Failed to register message_log migration path");

    migrator
}
