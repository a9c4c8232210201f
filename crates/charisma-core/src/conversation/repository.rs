//! Conversation projection repository trait.

use async_trait::async_trait;

use super::projection::ConversationProjection;
use crate::error::Result;

/// Persistence contract for the conversation projection.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Loads the stored projection, or `None` if none has been written.
    async fn load_projection(&self) -> Result<Option<ConversationProjection>>;

    /// Replaces the stored projection.
    async fn save_projection(&self, projection: &ConversationProjection) -> Result<()>;
}
