//! Read-state tracking.
//!
//! The log and the projection are the only two places unread state lives.
//! These functions mutate both together so that a view's `unread_count`
//! always matches the unacknowledged messages in the log.

use std::collections::HashSet;

use super::projection::ConversationProjection;
use crate::MessageId;
use crate::message::{Message, MessageLog};

/// Acknowledges the given messages and reconciles the projection.
///
/// Unknown ids and already acknowledged messages are ignored: a concurrent
/// delete is an expected race, not a fault. Returns the messages that changed.
pub fn mark_read(
    log: &mut MessageLog,
    projection: &mut ConversationProjection,
    message_ids: &HashSet<MessageId>,
) -> Vec<Message> {
    let changed = log.acknowledge(message_ids);
    projection.on_messages_acknowledged(&changed);
    changed
}

/// Acknowledges everything `counterparty` sent to `self_id` and drains the
/// view's unread count to zero.
pub fn mark_conversation_read(
    log: &mut MessageLog,
    projection: &mut ConversationProjection,
    self_id: &str,
    counterparty: &str,
) -> Vec<Message> {
    let unread = log.unread_ids(self_id, counterparty);
    let changed = mark_read(log, projection, &unread);
    projection.reset_unread(self_id, counterparty);
    changed
}
