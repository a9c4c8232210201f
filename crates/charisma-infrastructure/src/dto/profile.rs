//! SelfProfile DTOs and migrations

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use version_migrate::{FromDomain, IntoDomain, MigratesTo, Versioned};

use charisma_core::identity::{DEFAULT_DISPLAY_NAME, SelfProfile};

/// Legacy profile V1.0.0.
///
/// Written by early releases as a loosely-typed record; every field may be
/// missing. Unknown fields (notification and privacy settings) are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
#[serde(rename_all = "camelCase")]
pub struct SelfProfileV1_0_0 {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub join_date: Option<i64>,
}

/// Typed profile V2.0.0.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "2.0.0")]
pub struct SelfProfileV2_0_0 {
    /// Stable party id of self.
    pub id: String,
    /// Sequential handle. Empty when a legacy profile never had one.
    #[serde(default)]
    pub handle: String,
    pub display_name: String,
    pub joined_at: i64,
}

// ============================================================================
// Migration implementations
// ============================================================================

/// Generates a deterministic UUID from a legacy display name.
fn generate_uuid_from_name(name: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
}

/// Migration from SelfProfileV1_0_0 to SelfProfileV2_0_0.
///
/// A missing id is derived from the name so that repeated loads of the same
/// legacy record agree on it. A missing username leaves the handle empty for
/// the identity resolver to allocate.
impl MigratesTo<SelfProfileV2_0_0> for SelfProfileV1_0_0 {
    fn migrate(self) -> SelfProfileV2_0_0 {
        let display_name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string());
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| generate_uuid_from_name(&display_name));

        SelfProfileV2_0_0 {
            id,
            handle: self.username.unwrap_or_default(),
            display_name,
            joined_at: self.join_date.unwrap_or(0),
        }
    }
}

// ============================================================================
// Domain model conversions
// ============================================================================

impl IntoDomain<SelfProfile> for SelfProfileV2_0_0 {
    fn into_domain(self) -> SelfProfile {
        SelfProfile {
            id: self.id,
            handle: self.handle,
            display_name: self.display_name,
            joined_at: self.joined_at,
        }
    }
}

impl FromDomain<SelfProfile> for SelfProfileV2_0_0 {
    fn from_domain(profile: SelfProfile) -> Self {
        SelfProfileV2_0_0 {
            id: profile.id,
            handle: profile.handle,
            display_name: profile.display_name,
            joined_at: profile.joined_at,
        }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates and configures a Migrator instance for SelfProfile entities.
///
/// # Migration Path
///
/// - V1.0.0 → V2.0.0: Types the legacy record, deriving missing ids
/// - V2.0.0 → SelfProfile: Converts DTO to domain model
pub fn create_self_profile_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    let profile_path = version_migrate::Migrator::define("self_profile")
        .from::<SelfProfileV1_0_0>()
        .step::<SelfProfileV2_0_0>()
        .into_with_save::<SelfProfile>();

    migrator
        .register(profile_path)
        .expect("Failed to register self_profile migration path");

    migrator
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_legacy_profile_with_username() {
        let migrator = create_self_profile_migrator();
        let legacy = json!({
            "version": "1.0.0",
            "id": "1700000000000",
            "username": "user_0000001",
            "name": "Jane Doe",
            "joinDate": 1700000000000_i64,
            "notifications": true
        });

        let profile: SelfProfile = migrator.load_flat_from("self_profile", legacy).unwrap();
        assert_eq!(profile.id, "1700000000000");
        assert_eq!(profile.handle, "user_0000001");
        assert_eq!(profile.display_name, "Jane Doe");
        assert_eq!(profile.joined_at, 1_700_000_000_000);
    }

    #[test]
    fn test_legacy_profile_missing_fields() {
        let migrator = create_self_profile_migrator();
        let legacy = json!({ "version": "1.0.0" });

        let first: SelfProfile = migrator
            .load_flat_from("self_profile", legacy.clone())
            .unwrap();
        let second: SelfProfile = migrator.load_flat_from("self_profile", legacy).unwrap();

        assert_eq!(first.display_name, DEFAULT_DISPLAY_NAME);
        assert!(!first.has_handle());
        assert!(Uuid::parse_str(&first.id).is_ok());
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn test_save_writes_latest_version() {
        let migrator = create_self_profile_migrator();
        let profile = SelfProfile {
            id: "self-1".to_string(),
            handle: "user_0000003".to_string(),
            display_name: "Sam".to_string(),
            joined_at: 42,
        };

        let json_str = migrator.save_domain_flat("self_profile", profile).unwrap();
        assert!(json_str.contains("\"version\":\"2.0.0\""));
        assert!(json_str.contains("\"handle\":\"user_0000003\""));
    }
}
