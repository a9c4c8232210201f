//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::identity::DEFAULT_DISPLAY_NAME;
use crate::party::Party;

/// Storage keys used by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    pub profile: String,
    pub handle_counter: String,
    pub messages: String,
    pub conversations: String,
    pub parties: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            profile: "@charisma_profile".to_string(),
            handle_counter: "@charisma_user_counter".to_string(),
            messages: "@charisma_messages".to_string(),
            conversations: "@charisma_conversations".to_string(),
            parties: "@charisma_registered_users".to_string(),
        }
    }
}

/// Root configuration of the conversation index.
///
/// Every field has a default, so a partial `config.toml` is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Prefix of allocated handles.
    pub handle_prefix: String,
    /// Zero-padded width of the handle counter.
    pub handle_width: usize,
    /// Display name of a freshly allocated identity.
    pub default_display_name: String,
    pub keys: StorageKeys,
    /// Parties written to the directory the first time it is read and found
    /// never to have been stored.
    pub seed_parties: Vec<Party>,
    /// Compare the stored projection against a full rebuild on open.
    pub verify_on_open: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            handle_prefix: "user_".to_string(),
            handle_width: 7,
            default_display_name: DEFAULT_DISPLAY_NAME.to_string(),
            keys: StorageKeys::default(),
            seed_parties: Vec::new(),
            verify_on_open: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
handle_prefix = "member_"

[keys]
messages = "msgs"

[[seed_parties]]
id = "demo_user_1"
display_name = "Alex Johnson"
handle = "user_0000002"
"#,
        )
        .unwrap();

        assert_eq!(config.handle_prefix, "member_");
        assert_eq!(config.handle_width, 7);
        assert_eq!(config.keys.messages, "msgs");
        assert_eq!(config.keys.profile, "@charisma_profile");
        assert_eq!(config.seed_parties.len(), 1);
        assert!(!config.seed_parties[0].presence.online);
        assert!(config.verify_on_open);
    }
}
