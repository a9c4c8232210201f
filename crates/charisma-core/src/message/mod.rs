//! Message domain module.
//!
//! - `model`: the `Message` record and its acknowledgement state
//! - `log`: the append-only `MessageLog`, source of truth for everything else
//! - `repository`: persistence contract for the log

mod log;
mod model;
mod repository;

pub use log::MessageLog;
pub use model::{AckState, Message, message_id};
pub use repository::MessageRepository;
