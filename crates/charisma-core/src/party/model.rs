//! Party domain model.

use serde::{Deserialize, Serialize};

use crate::{PartyId, Timestamp};

/// Advisory presence information. Carries no liveness guarantee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Presence {
    pub online: bool,
    pub last_active_at: Timestamp,
}

impl Presence {
    pub fn online_at(now: Timestamp) -> Self {
        Self {
            online: true,
            last_active_at: now,
        }
    }

    pub fn offline_since(last_active_at: Timestamp) -> Self {
        Self {
            online: false,
            last_active_at,
        }
    }
}

/// An identified participant in messaging, either self or a counterparty.
///
/// `id` is the only lookup key. `display_name` and `handle` are mutable and
/// may collide across parties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: PartyId,
    pub display_name: String,
    pub handle: String,
    #[serde(default)]
    pub presence: Presence,
    /// Hidden parties stay in the directory but are left out of listings.
    #[serde(default)]
    pub hidden: bool,
}

impl Party {
    pub fn new(
        id: impl Into<PartyId>,
        display_name: impl Into<String>,
        handle: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            handle: handle.into(),
            presence: Presence::default(),
            hidden: false,
        }
    }

    pub fn with_presence(mut self, presence: Presence) -> Self {
        self.presence = presence;
        self
    }

    /// Applies last-write-wins on the mutable fields of `incoming`.
    ///
    /// `id` and the `hidden` flag of `self` are preserved.
    pub fn merge_from(&mut self, incoming: Party) {
        debug_assert_eq!(self.id, incoming.id);
        self.display_name = incoming.display_name;
        self.handle = incoming.handle;
        self.presence = incoming.presence;
    }
}

/// The full set of known parties, as stored under one key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyDirectory {
    pub parties: Vec<Party>,
}

impl PartyDirectory {
    pub fn new(parties: Vec<Party>) -> Self {
        Self { parties }
    }

    pub fn get(&self, id: &str) -> Option<&Party> {
        self.parties.iter().find(|p| p.id == id)
    }

    /// Inserts `party` if its id is unknown, otherwise merges it into the
    /// existing entry. Returns `true` when a new entry was created.
    pub fn upsert(&mut self, party: Party) -> bool {
        match self.parties.iter_mut().find(|p| p.id == party.id) {
            Some(existing) => {
                existing.merge_from(party);
                false
            }
            None => {
                self.parties.push(party);
                true
            }
        }
    }

    /// Marks a party hidden. Returns `false` if the id is unknown.
    pub fn hide(&mut self, id: &str) -> bool {
        match self.parties.iter_mut().find(|p| p.id == id) {
            Some(existing) => {
                existing.hidden = true;
                true
            }
            None => false,
        }
    }

    /// Parties that are not hidden, in insertion order.
    pub fn visible(&self) -> Vec<Party> {
        self.parties.iter().filter(|p| !p.hidden).cloned().collect()
    }
}
