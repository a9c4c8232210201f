//! Configuration service implementation.
//!
//! Loads the engine configuration from `config.toml`, falling back to
//! defaults when the file does not exist.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use charisma_core::config::EngineConfig;
use charisma_core::error::{CharismaError, Result};

use crate::paths::CharismaPaths;

/// Configuration service that loads and caches the engine configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    config: Arc<RwLock<Option<EngineConfig>>>,
}

impl ConfigService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Uses the config file resolved by `paths`.
    pub fn from_paths(paths: &CharismaPaths) -> Result<Self> {
        Ok(Self::new(paths.config_file()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading it on first access.
    pub fn get_config(&self) -> Result<EngineConfig> {
        {
            let read_lock = self
                .config
                .read()
                .map_err(|_| CharismaError::internal("config cache lock poisoned"))?;
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = Self::load_from(&self.path)?;

        let mut write_lock = self
            .config
            .write()
            .map_err(|_| CharismaError::internal("config cache lock poisoned"))?;
        *write_lock = Some(loaded.clone());

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    /// Reads a config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<EngineConfig> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config file at {:?}, using defaults", path);
                return Ok(EngineConfig::default());
            }
            Err(e) => {
                return Err(CharismaError::config(format!(
                    "Failed to read config file {:?}: {}",
                    path, e
                )));
            }
        };

        let config: EngineConfig = toml::from_str(&content)?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }
}
