//! Message log repository trait.

use async_trait::async_trait;

use super::log::MessageLog;
use crate::error::Result;

/// Persistence contract for the message log.
///
/// The log is stored as one document so that every write replaces it
/// atomically.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Loads the log. A store that has never been written yields an empty log.
    async fn load_log(&self) -> Result<MessageLog>;

    /// Replaces the stored log.
    async fn save_log(&self, log: &MessageLog) -> Result<()>;
}
