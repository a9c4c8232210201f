//! Append-only message log.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::model::{Message, message_id};
use crate::error::{CharismaError, Result};
use crate::{MessageId, Timestamp};

/// Ordered record of every message in the installation.
///
/// Messages are kept sorted by `(created_at, sequence)`. `append` never
/// assigns a `created_at` earlier than the latest one already stored, so a
/// new message is always the most recent. `revision` increases on every
/// mutation and lets a stored projection tell whether it is up to date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLog {
    messages: Vec<Message>,
    next_sequence: u64,
    revision: u64,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a log from stored parts, restoring the ordering invariant.
    ///
    /// `next_sequence` is raised above every stored sequence so that ids are
    /// never reused even if the stored counter lagged behind.
    pub fn from_parts(mut messages: Vec<Message>, next_sequence: u64, revision: u64) -> Self {
        messages.sort_by_key(Message::order_key);
        let floor = messages
            .iter()
            .map(|m| m.sequence + 1)
            .max()
            .unwrap_or(0);
        Self {
            messages,
            next_sequence: next_sequence.max(floor),
            revision,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    fn latest_created_at(&self) -> Option<Timestamp> {
        self.messages.last().map(|m| m.created_at)
    }

    /// Validates and appends a new message. This is the only way messages
    /// enter the log.
    ///
    /// The body is stored trimmed. If `now` is earlier than the latest stored
    /// message (clock skew), the latest timestamp is reused and the sequence
    /// number breaks the tie.
    ///
    /// # Errors
    ///
    /// `InvalidMessage` when either party id is empty, the parties are equal,
    /// or the trimmed body is empty.
    pub fn append(
        &mut self,
        from_party: &str,
        to_party: &str,
        body: &str,
        now: Timestamp,
    ) -> Result<Message> {
        if from_party.trim().is_empty() || to_party.trim().is_empty() {
            return Err(CharismaError::invalid_message("party ids must not be empty"));
        }
        if from_party == to_party {
            return Err(CharismaError::invalid_message(format!(
                "sender and recipient are the same party '{}'",
                from_party
            )));
        }
        let body = body.trim();
        if body.is_empty() {
            return Err(CharismaError::invalid_message("message body is empty"));
        }

        let created_at = self.latest_created_at().map_or(now, |latest| latest.max(now));
        let sequence = self.next_sequence;
        let message = Message {
            id: message_id(created_at, sequence),
            sequence,
            from_party: from_party.to_string(),
            to_party: to_party.to_string(),
            body: body.to_string(),
            created_at,
            is_acknowledged: false,
        };

        self.messages.push(message.clone());
        self.next_sequence += 1;
        self.revision += 1;
        Ok(message)
    }

    /// Full bidirectional history between two parties, oldest first.
    pub fn list_between(&self, a: &str, b: &str) -> Vec<Message> {
        self.messages
            .iter()
            .filter(|m| m.is_between(a, b))
            .cloned()
            .collect()
    }

    /// Removes every message between two parties. Returns how many were removed.
    pub fn delete_between(&mut self, a: &str, b: &str) -> usize {
        let before = self.messages.len();
        self.messages.retain(|m| !m.is_between(a, b));
        let removed = before - self.messages.len();
        if removed > 0 {
            self.revision += 1;
        }
        removed
    }

    /// Acknowledges the given messages.
    ///
    /// Unknown ids and already acknowledged messages are skipped silently.
    /// Returns the messages whose state actually changed, after the change.
    pub fn acknowledge(&mut self, ids: &HashSet<MessageId>) -> Vec<Message> {
        let mut changed = Vec::new();
        for message in self.messages.iter_mut() {
            if ids.contains(&message.id) && message.acknowledge() {
                changed.push(message.clone());
            }
        }
        if !changed.is_empty() {
            self.revision += 1;
        }
        changed
    }

    /// Ids of messages from `counterparty` to `owner` that are still unread.
    pub fn unread_ids(&self, owner: &str, counterparty: &str) -> HashSet<MessageId> {
        self.messages
            .iter()
            .filter(|m| m.from_party == counterparty && m.is_unread_for(owner))
            .map(|m| m.id.clone())
            .collect()
    }

    /// Number of unread messages from `counterparty` to `owner`.
    pub fn unread_count(&self, owner: &str, counterparty: &str) -> u32 {
        self.messages
            .iter()
            .filter(|m| m.from_party == counterparty && m.is_unread_for(owner))
            .count() as u32
    }
}
