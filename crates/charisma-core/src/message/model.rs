//! Message domain model.

use serde::{Deserialize, Serialize};

use crate::{MessageId, PartyId, Timestamp};

/// Acknowledgement state of a message. `Unread -> Read` is the only transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckState {
    Unread,
    Read,
}

/// One directed communication event.
///
/// Everything except `is_acknowledged` is immutable once the message has been
/// appended to the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    /// Insertion order within the installation, never reused.
    pub sequence: u64,
    pub from_party: PartyId,
    pub to_party: PartyId,
    pub body: String,
    pub created_at: Timestamp,
    pub is_acknowledged: bool,
}

/// Builds the id of a message from its creation time and sequence number.
///
/// Ids sort lexicographically in creation order for non-negative timestamps.
pub fn message_id(created_at: Timestamp, sequence: u64) -> MessageId {
    format!("{:013}-{:06}", created_at, sequence)
}

impl Message {
    pub fn ack_state(&self) -> AckState {
        if self.is_acknowledged {
            AckState::Read
        } else {
            AckState::Unread
        }
    }

    /// Moves the message to `Read`. Returns `true` if the state changed.
    pub fn acknowledge(&mut self) -> bool {
        match self.ack_state() {
            AckState::Unread => {
                self.is_acknowledged = true;
                true
            }
            AckState::Read => false,
        }
    }

    /// True if the message travels between `a` and `b`, in either direction.
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.from_party == a && self.to_party == b) || (self.from_party == b && self.to_party == a)
    }

    /// The other endpoint of the message as seen from `owner`.
    pub fn counterparty_of(&self, owner: &str) -> Option<&str> {
        if self.from_party == owner {
            Some(&self.to_party)
        } else if self.to_party == owner {
            Some(&self.from_party)
        } else {
            None
        }
    }

    /// True if this message counts towards `owner`'s unread total.
    pub fn is_unread_for(&self, owner: &str) -> bool {
        self.to_party == owner && self.ack_state() == AckState::Unread
    }

    /// Sort key used everywhere messages are ordered.
    pub fn order_key(&self) -> (Timestamp, u64) {
        (self.created_at, self.sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(from: &str, to: &str) -> Message {
        Message {
            id: message_id(100, 0),
            sequence: 0,
            from_party: from.to_string(),
            to_party: to.to_string(),
            body: "hi".to_string(),
            created_at: 100,
            is_acknowledged: false,
        }
    }

    #[test]
    fn test_message_id_format() {
        assert_eq!(message_id(1_700_000_000_000, 42), "1700000000000-000042");
    }

    #[test]
    fn test_acknowledge_is_one_way() {
        let mut msg = message("a", "b");
        assert_eq!(msg.ack_state(), AckState::Unread);
        assert!(msg.acknowledge());
        assert!(!msg.acknowledge());
        assert_eq!(msg.ack_state(), AckState::Read);
    }

    #[test]
    fn test_counterparty_and_direction() {
        let msg = message("a", "b");
        assert_eq!(msg.counterparty_of("a"), Some("b"));
        assert_eq!(msg.counterparty_of("b"), Some("a"));
        assert_eq!(msg.counterparty_of("c"), None);
        assert!(msg.is_between("b", "a"));
        assert!(msg.is_unread_for("b"));
        assert!(!msg.is_unread_for("a"));
    }

    #[test]
    fn test_read_message_is_not_unread() {
        let mut msg = message("a", "b");
        msg.acknowledge();
        assert!(!msg.is_unread_for("b"));
    }
}
