//! Domain layer of the Charisma conversation index.
//!
//! Everything in this crate is storage-agnostic: the message log and the
//! conversation projection are plain in-memory structures, and persistence is
//! reached only through the repository traits and [`storage::KeyValueStore`].

pub mod config;
pub mod conversation;
pub mod error;
pub mod identity;
pub mod message;
pub mod party;
pub mod storage;

// Re-export common error type
pub use error::{CharismaError, Result};

/// Opaque, stable identifier of a party.
pub type PartyId = String;

/// Identifier of a message, unique within one installation.
pub type MessageId = String;

/// Milliseconds since the UNIX epoch.
pub type Timestamp = i64;
