//! Conversation projection: one view per (owner, counterparty) pair.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use super::model::{ConversationView, ProjectionSnapshot};
use crate::PartyId;
use crate::error::{CharismaError, Result};
use crate::message::{Message, MessageLog};

type ViewKey = (PartyId, PartyId);

fn key(owner: &str, counterparty: &str) -> ViewKey {
    (owner.to_string(), counterparty.to_string())
}

/// Derived, queryable view of conversations.
///
/// A view for `(owner, counterparty)` exists exactly when at least one
/// message between them exists in the log, and its `unread_count` equals the
/// number of unacknowledged messages from counterparty to owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationProjection {
    views: BTreeMap<ViewKey, ConversationView>,
    log_revision: u64,
}

impl ConversationProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the projection from scratch.
    pub fn rebuild(log: &MessageLog) -> Self {
        let mut projection = Self::new();
        for message in log.messages() {
            projection.apply(message);
        }
        projection.log_revision = log.revision();
        projection
    }

    pub fn from_snapshot(snapshot: ProjectionSnapshot) -> Self {
        let views = snapshot
            .views
            .into_iter()
            .map(|view| (key(&view.owner, &view.counterparty), view))
            .collect();
        Self {
            views,
            log_revision: snapshot.log_revision,
        }
    }

    pub fn to_snapshot(&self) -> ProjectionSnapshot {
        ProjectionSnapshot {
            log_revision: self.log_revision,
            views: self.views.values().cloned().collect(),
        }
    }

    /// Revision of the message log these views reflect.
    pub fn log_revision(&self) -> u64 {
        self.log_revision
    }

    pub fn sync_revision(&mut self, revision: u64) {
        self.log_revision = revision;
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Folds a freshly appended message into the views of both endpoints.
    pub fn apply(&mut self, message: &Message) {
        self.on_message_appended(message, &message.from_party);
        self.on_message_appended(message, &message.to_party);
    }

    /// Folds a freshly appended message into `self_id`'s view of the
    /// conversation. Messages not involving `self_id` are ignored.
    ///
    /// The message always becomes `last_message`: the log hands out
    /// non-decreasing timestamps, and on equal timestamps the later append
    /// wins.
    pub fn on_message_appended(&mut self, message: &Message, self_id: &str) {
        let Some(counterparty) = message.counterparty_of(self_id) else {
            return;
        };
        let view = self
            .views
            .entry(key(self_id, counterparty))
            .or_insert_with(|| ConversationView::new(self_id, counterparty, message));

        view.last_message = message.clone();
        view.updated_at = message.created_at;
        if message.from_party == counterparty && !message.is_acknowledged {
            view.unread_count += 1;
        }
    }

    /// Reconciles acknowledgements made in the log.
    ///
    /// `acknowledged` must contain only messages whose state just changed,
    /// as returned by [`MessageLog::acknowledge`].
    pub fn on_messages_acknowledged(&mut self, acknowledged: &[Message]) {
        for message in acknowledged {
            if let Some(view) = self
                .views
                .get_mut(&key(&message.to_party, &message.from_party))
            {
                view.unread_count = view.unread_count.saturating_sub(1);
                if view.last_message.id == message.id {
                    view.last_message.is_acknowledged = true;
                }
            }
            if let Some(view) = self
                .views
                .get_mut(&key(&message.from_party, &message.to_party))
            {
                if view.last_message.id == message.id {
                    view.last_message.is_acknowledged = true;
                }
            }
        }
    }

    /// Drops the view entirely.
    pub fn on_conversation_deleted(
        &mut self,
        owner: &str,
        counterparty: &str,
    ) -> Option<ConversationView> {
        self.views.remove(&key(owner, counterparty))
    }

    pub fn reset_unread(&mut self, owner: &str, counterparty: &str) {
        if let Some(view) = self.views.get_mut(&key(owner, counterparty)) {
            view.unread_count = 0;
        }
    }

    pub fn get(&self, owner: &str, counterparty: &str) -> Option<&ConversationView> {
        self.views.get(&key(owner, counterparty))
    }

    /// Views owned by `self_id`, most recently updated first; equal
    /// timestamps are ordered by counterparty id ascending.
    pub fn list(&self, self_id: &str) -> Vec<ConversationView> {
        let mut views: Vec<ConversationView> = self
            .views
            .values()
            .filter(|view| view.owner == self_id)
            .cloned()
            .collect();
        views.sort_by(|a, b| {
            Reverse(a.updated_at)
                .cmp(&Reverse(b.updated_at))
                .then_with(|| a.counterparty.cmp(&b.counterparty))
        });
        views
    }

    /// Sum of unread counts across all of `self_id`'s conversations.
    pub fn total_unread(&self, self_id: &str) -> u32 {
        self.views
            .values()
            .filter(|view| view.owner == self_id)
            .map(|view| view.unread_count)
            .sum()
    }

    /// Compares the views against a full rebuild from `log`.
    ///
    /// # Errors
    ///
    /// `Inconsistent` describing the first differing pair.
    pub fn verify(&self, log: &MessageLog) -> Result<()> {
        let expected = Self::rebuild(log);
        if expected.views == self.views {
            return Ok(());
        }

        for (pair, view) in &expected.views {
            match self.views.get(pair) {
                None => {
                    return Err(CharismaError::inconsistent(format!(
                        "missing view for owner '{}' and counterparty '{}'",
                        pair.0, pair.1
                    )));
                }
                Some(actual) if actual.unread_count != view.unread_count => {
                    return Err(CharismaError::inconsistent(format!(
                        "unread count for owner '{}' and counterparty '{}' is {}, log says {}",
                        pair.0, pair.1, actual.unread_count, view.unread_count
                    )));
                }
                Some(actual) if actual != view => {
                    return Err(CharismaError::inconsistent(format!(
                        "stale last message for owner '{}' and counterparty '{}'",
                        pair.0, pair.1
                    )));
                }
                Some(_) => {}
            }
        }
        let orphan = self
            .views
            .keys()
            .find(|pair| !expected.views.contains_key(*pair));
        match orphan {
            Some(pair) => Err(CharismaError::inconsistent(format!(
                "view for owner '{}' and counterparty '{}' has no messages",
                pair.0, pair.1
            ))),
            None => Err(CharismaError::inconsistent("views differ from log")),
        }
    }
}
