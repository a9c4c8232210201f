//! Data Transfer Objects (DTOs) for persistence.
//!
//! These DTOs represent the versioned schema of every stored document.
//! They are private to the infrastructure layer and handle the evolution
//! of the storage format over time.
//!
//! ## Schema Versioning (Semantic Versioning)
//!
//! - **MAJOR (X.0.0)**: Breaking changes (field removal, type changes)
//! - **MINOR (1.X.0)**: Backward-compatible additions (new optional fields)
//!
//! ### SelfProfile Version History
//! - **1.0.0**: Legacy loosely-typed profile (`id`, `username`, `name` all optional)
//! - **2.0.0**: Typed profile (`id`, `handle`, `display_name`, `joined_at`)
//!
//! ### MessageLog Version History
//! - **1.0.0**: Bare array of camelCase message records, no sequence numbers
//! - **1.1.0**: Explicit per-message `sequence`, `next_sequence` and `revision`
//!
//! ### ConversationProjection Version History
//! - **1.0.0**: Views plus the `log_revision` watermark
//!
//! ### Directory Version History
//! - **1.0.0**: Bare array of camelCase registered-user records
//! - **1.1.0**: Typed parties with flattened presence and a `hidden` flag

mod directory;
mod message_log;
mod profile;
mod projection;

pub use directory::{
    DirectoryV1_0_0, DirectoryV1_1_0, PartyV1_0_0, PartyV1_1_0, create_directory_migrator,
};
pub use message_log::{
    MessageLogV1_0_0, MessageLogV1_1_0, MessageV1_0_0, MessageV1_1_0, create_message_log_migrator,
};
pub use profile::{SelfProfileV1_0_0, SelfProfileV2_0_0, create_self_profile_migrator};
pub use projection::{
    ConversationProjectionV1_0_0, ConversationViewV1_0_0, create_conversation_projection_migrator,
};
