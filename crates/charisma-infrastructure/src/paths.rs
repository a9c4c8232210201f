//! Path management for charisma storage and configuration.

use std::path::PathBuf;

use charisma_core::error::CharismaError;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform data directory could not be determined.
    DataDirNotFound,
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::DataDirNotFound => write!(f, "Cannot find data directory"),
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for CharismaError {
    fn from(err: PathError) -> Self {
        CharismaError::config(err.to_string())
    }
}

/// Path management for charisma.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/charisma/          # Config directory
/// └── config.toml              # Engine configuration
///
/// ~/.local/share/charisma/     # Data directory
/// └── store/                   # One JSON file per storage key
/// ```
///
/// With an explicit base directory both live under that directory instead.
#[derive(Debug, Clone, Default)]
pub struct CharismaPaths {
    base: Option<PathBuf>,
}

impl CharismaPaths {
    const APP_DIR: &'static str = "charisma";

    /// Creates a path resolver. `None` uses the platform directories.
    pub fn new(base: Option<PathBuf>) -> Self {
        Self { base }
    }

    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join(Self::APP_DIR))
                .ok_or(PathError::DataDirNotFound),
        }
    }

    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(Self::APP_DIR))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    /// Directory backing the file key-value store.
    pub fn store_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("store"))
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_base() {
        let paths = CharismaPaths::new(Some(PathBuf::from("/tmp/charisma-test")));

        assert_eq!(
            paths.store_dir().unwrap(),
            PathBuf::from("/tmp/charisma-test/store")
        );
        assert_eq!(
            paths.config_file().unwrap(),
            PathBuf::from("/tmp/charisma-test/config.toml")
        );
    }

    #[test]
    fn test_default_paths_end_with_app_dir() {
        let paths = CharismaPaths::default();
        if let Ok(store) = paths.store_dir() {
            assert!(store.ends_with("charisma/store"));
        }
    }
}
