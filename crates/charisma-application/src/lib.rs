//! Application layer for Charisma.
//!
//! Coordinates the core domain model and the persistence layer into the
//! conversation index engine: identity resolution, the party directory, the
//! message log and its conversation projection.

pub mod clock;
pub mod conversation_index;
pub mod directory_service;
pub mod identity_resolver;

pub use clock::{Clock, ManualClock, SystemClock};
pub use conversation_index::ConversationIndex;
pub use directory_service::DirectoryService;
pub use identity_resolver::IdentityResolver;
