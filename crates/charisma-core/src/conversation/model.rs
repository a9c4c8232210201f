//! Conversation view model.

use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::{PartyId, Timestamp};

/// Aggregate for one (owner, counterparty) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationView {
    /// The party this view belongs to ("self").
    pub owner: PartyId,
    pub counterparty: PartyId,
    /// Most recent message between owner and counterparty.
    pub last_message: Message,
    /// Messages from counterparty to owner that are not acknowledged.
    pub unread_count: u32,
    /// Always equal to `last_message.created_at`.
    pub updated_at: Timestamp,
}

impl ConversationView {
    pub(crate) fn new(owner: &str, counterparty: &str, message: &Message) -> Self {
        Self {
            owner: owner.to_string(),
            counterparty: counterparty.to_string(),
            last_message: message.clone(),
            unread_count: 0,
            updated_at: message.created_at,
        }
    }
}

/// Persisted form of a projection.
///
/// `log_revision` is the message log revision the views reflect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionSnapshot {
    pub log_revision: u64,
    pub views: Vec<ConversationView>,
}
