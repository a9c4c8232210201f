//! Conversation domain module.
//!
//! The projection is a derived view over the message log. It is updated
//! incrementally by the engine and can always be rebuilt from the log; both
//! paths must produce identical results.

mod model;
mod projection;
pub mod read_state;
mod repository;

pub use model::{ConversationView, ProjectionSnapshot};
pub use projection::ConversationProjection;
pub use repository::ConversationRepository;
