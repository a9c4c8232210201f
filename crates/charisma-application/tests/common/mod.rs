//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use charisma_application::{ConversationIndex, ManualClock};
use charisma_core::config::EngineConfig;
use charisma_core::error::{CharismaError, Result};
use charisma_core::storage::KeyValueStore;
use charisma_infrastructure::InMemoryKeyValueStore;

/// Key-value store whose writes to selected keys can be made to fail.
#[derive(Clone, Default)]
pub struct FlakyStore {
    pub inner: InMemoryKeyValueStore,
    failing: Arc<Mutex<HashSet<String>>>,
    unreadable: Arc<Mutex<HashSet<String>>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes_to(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    pub fn fail_reads_from(&self, key: &str) {
        self.unreadable.lock().unwrap().insert(key.to_string());
    }

    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
        self.unreadable.lock().unwrap().clear();
    }

    fn check(&self, key: &str) -> Result<()> {
        if self.failing.lock().unwrap().contains(key) {
            return Err(CharismaError::storage(format!("injected failure for '{}'", key)));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if self.unreadable.lock().unwrap().contains(key) {
            return Err(CharismaError::storage(format!("injected read failure for '{}'", key)));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.check(key)?;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check(key)?;
        self.inner.remove(key).await
    }
}

pub async fn open_index(
    store: Arc<dyn KeyValueStore>,
    clock: Arc<ManualClock>,
) -> ConversationIndex {
    ConversationIndex::open_with_clock(store, EngineConfig::default(), clock)
        .await
        .unwrap()
}
