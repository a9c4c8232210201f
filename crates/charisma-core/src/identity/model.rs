//! Self profile model.

use serde::{Deserialize, Serialize};

use crate::party::{Party, Presence};
use crate::{PartyId, Timestamp};

/// Display name given to a freshly allocated identity.
pub const DEFAULT_DISPLAY_NAME: &str = "Charisma User";

/// The durable identity of the current actor of an installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfProfile {
    pub id: PartyId,
    /// Sequential handle; empty only for legacy profiles awaiting allocation.
    pub handle: String,
    pub display_name: String,
    pub joined_at: Timestamp,
}

impl SelfProfile {
    pub fn has_handle(&self) -> bool {
        !self.handle.is_empty()
    }

    /// The directory entry for this identity, marked online at `now`.
    pub fn to_party(&self, now: Timestamp) -> Party {
        Party::new(self.id.clone(), self.display_name.clone(), self.handle.clone())
            .with_presence(Presence::online_at(now))
    }
}
