//! Directory of known parties.

use std::sync::Arc;

use tokio::sync::Mutex;

use charisma_core::error::{CharismaError, Result};
use charisma_core::party::{Party, PartyDirectory, PartyRepository};

/// Registry of every party seen by this installation, self included.
///
/// The directory is loaded once and kept in memory. Writes go to storage
/// first and only then replace the cached copy.
pub struct DirectoryService {
    repository: Arc<dyn PartyRepository>,
    seed: Vec<Party>,
    cached: Mutex<Option<PartyDirectory>>,
}

impl DirectoryService {
    pub fn new(repository: Arc<dyn PartyRepository>, seed: Vec<Party>) -> Self {
        Self {
            repository,
            seed,
            cached: Mutex::new(None),
        }
    }

    /// All non-hidden parties, in registration order.
    pub async fn list_known_parties(&self) -> Result<Vec<Party>> {
        let mut cached = self.cached.lock().await;
        Ok(self.loaded(&mut cached).await?.visible())
    }

    pub async fn get_party(&self, id: &str) -> Result<Option<Party>> {
        let mut cached = self.cached.lock().await;
        Ok(self.loaded(&mut cached).await?.get(id).cloned())
    }

    /// Inserts the party, or merges its mutable fields into the existing entry.
    pub async fn upsert_party(&self, party: Party) -> Result<()> {
        if party.id.trim().is_empty() {
            return Err(CharismaError::InvalidParty(
                "party id must not be empty".to_string(),
            ));
        }

        let mut cached = self.cached.lock().await;
        let mut directory = self.loaded(&mut cached).await?.clone();
        let party_id = party.id.clone();
        let inserted = directory.upsert(party);

        self.repository.save(&directory).await?;
        tracing::debug!(
            "{} party {}",
            if inserted { "Registered" } else { "Updated" },
            party_id
        );

        *cached = Some(directory);
        Ok(())
    }

    /// Registers every id not yet in the directory, named after its id.
    ///
    /// Existing entries, hidden or not, are left as they are. Nothing is
    /// written when all ids are already known.
    pub async fn observe(&self, ids: &[&str]) -> Result<()> {
        let mut cached = self.cached.lock().await;
        let current = self.loaded(&mut cached).await?;
        let missing: Vec<&str> = ids
            .iter()
            .copied()
            .filter(|id| !id.trim().is_empty() && current.get(id).is_none())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }

        let mut directory = current.clone();
        for id in &missing {
            if directory.get(id).is_none() {
                directory.upsert(Party::new(*id, *id, ""));
            }
        }

        self.repository.save(&directory).await?;
        tracing::debug!("Registered counterparties {:?}", missing);

        *cached = Some(directory);
        Ok(())
    }

    /// Hides a party from listings.
    pub async fn hide_party(&self, id: &str) -> Result<()> {
        let mut cached = self.cached.lock().await;
        let mut directory = self.loaded(&mut cached).await?.clone();
        if !directory.hide(id) {
            return Err(CharismaError::not_found("party", id));
        }

        self.repository.save(&directory).await?;
        tracing::debug!("Hid party {}", id);

        *cached = Some(directory);
        Ok(())
    }

    async fn loaded<'a>(
        &self,
        cached: &'a mut Option<PartyDirectory>,
    ) -> Result<&'a PartyDirectory> {
        if cached.is_none() {
            let directory = match self.repository.load().await? {
                Some(directory) => directory,
                None if !self.seed.is_empty() => {
                    let seeded = PartyDirectory::new(self.seed.clone());
                    self.repository.save(&seeded).await?;
                    tracing::info!("Seeded directory with {} parties", seeded.parties.len());
                    seeded
                }
                None => PartyDirectory::default(),
            };
            *cached = Some(directory);
        }

        cached
            .as_ref()
            .ok_or_else(|| CharismaError::internal("directory cache empty after load"))
    }
}
