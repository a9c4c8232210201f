//! Party directory DTOs

use serde::{Deserialize, Serialize};
use version_migrate::{FromDomain, IntoDomain, MigratesTo, Versioned};

use charisma_core::party::{Party, PartyDirectory, Presence};

/// Registered user record V1.0.0, as written by the first mobile releases.
///
/// Those releases stored a bare JSON array of these records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyV1_0_0 {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_online: Option<bool>,
    #[serde(default)]
    pub last_seen: Option<i64>,
}

/// Directory V1.0.0.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct DirectoryV1_0_0 {
    #[serde(default)]
    pub parties: Vec<PartyV1_0_0>,
}

/// Party record V1.1.0 with presence flattened and a `hidden` flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyV1_1_0 {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub last_active_at: i64,
    #[serde(default)]
    pub hidden: bool,
}

/// Directory V1.1.0.
#[derive(Debug, Clone, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.1.0")]
pub struct DirectoryV1_1_0 {
    #[serde(default)]
    pub parties: Vec<PartyV1_1_0>,
}

/// Records without an id are dropped; a missing name falls back to the id.
impl MigratesTo<DirectoryV1_1_0> for DirectoryV1_0_0 {
    fn migrate(self) -> DirectoryV1_1_0 {
        let parties = self
            .parties
            .into_iter()
            .filter(|p| !p.id.is_empty())
            .map(|p| PartyV1_1_0 {
                display_name: p
                    .name
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| p.id.clone()),
                handle: p.username.unwrap_or_default(),
                online: p.is_online.unwrap_or(false),
                last_active_at: p.last_seen.unwrap_or(0),
                hidden: false,
                id: p.id,
            })
            .collect();

        DirectoryV1_1_0 { parties }
    }
}

impl From<PartyV1_1_0> for Party {
    fn from(dto: PartyV1_1_0) -> Self {
        Party {
            id: dto.id,
            display_name: dto.display_name,
            handle: dto.handle,
            presence: Presence {
                online: dto.online,
                last_active_at: dto.last_active_at,
            },
            hidden: dto.hidden,
        }
    }
}

impl From<Party> for PartyV1_1_0 {
    fn from(party: Party) -> Self {
        PartyV1_1_0 {
            id: party.id,
            display_name: party.display_name,
            handle: party.handle,
            online: party.presence.online,
            last_active_at: party.presence.last_active_at,
            hidden: party.hidden,
        }
    }
}

impl IntoDomain<PartyDirectory> for DirectoryV1_1_0 {
    fn into_domain(self) -> PartyDirectory {
        PartyDirectory::new(self.parties.into_iter().map(Into::into).collect())
    }
}

impl FromDomain<PartyDirectory> for DirectoryV1_1_0 {
    fn from_domain(directory: PartyDirectory) -> Self {
        DirectoryV1_1_0 {
            parties: directory.parties.into_iter().map(Into::into).collect(),
        }
    }
}

/// Creates a Migrator for the party directory.
pub fn create_directory_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    let directory_path = version_migrate::Migrator::define("directory")
        .from::<DirectoryV1_0_0>()
        .step::<DirectoryV1_1_0>()
        .into_with_save::<PartyDirectory>();

    migrator
        .register(directory_path)
        .expect("Failed to register directory migration path");

    migrator
}
