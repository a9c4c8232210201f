//! ConversationProjection DTOs

use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, Versioned};

use charisma_core::conversation::{ConversationView, ProjectionSnapshot};

use super::message_log::MessageV1_1_0;

/// Conversation view V1.0.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationViewV1_0_0 {
    pub owner: String,
    pub counterparty: String,
    pub last_message: MessageV1_1_0,
    pub unread_count: u32,
    pub updated_at: i64,
}

/// Conversation projection V1.0.0.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct ConversationProjectionV1_0_0 {
    /// Message log revision the views reflect.
    pub log_revision: u64,
    #[serde(default)]
    pub views: Vec<ConversationViewV1_0_0>,
}

impl From<ConversationViewV1_0_0> for ConversationView {
    fn from(dto: ConversationViewV1_0_0) -> Self {
        ConversationView {
            owner: dto.owner,
            counterparty: dto.counterparty,
            last_message: dto.last_message.into(),
            unread_count: dto.unread_count,
            updated_at: dto.updated_at,
        }
    }
}

impl From<ConversationView> for ConversationViewV1_0_0 {
    fn from(view: ConversationView) -> Self {
        ConversationViewV1_0_0 {
            last_message: (&view.last_message).into(),
            owner: view.owner,
            counterparty: view.counterparty,
            unread_count: view.unread_count,
            updated_at: view.updated_at,
        }
    }
}

impl IntoDomain<ProjectionSnapshot> for ConversationProjectionV1_0_0 {
    fn into_domain(self) -> ProjectionSnapshot {
        ProjectionSnapshot {
            log_revision: self.log_revision,
            views: self.views.into_iter().map(Into::into).collect(),
        }
    }
}

impl FromDomain<ProjectionSnapshot> for ConversationProjectionV1_0_0 {
    fn from_domain(snapshot: ProjectionSnapshot) -> Self {
        ConversationProjectionV1_0_0 {
            log_revision: snapshot.log_revision,
            views: snapshot.views.into_iter().map(Into::into).collect(),
        }
    }
}

/// Creates a Migrator for the conversation projection.
pub fn create_conversation_projection_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    let projection_path = version_migrate::Migrator::define("conversation_projection")
        .from::<ConversationProjectionV1_0_0>()
        .into_with_save::<ProjectionSnapshot>();

    migrator
        .register(projection_path)
        .expect("Failed to register conversation_projection migration path");

    migrator
}
