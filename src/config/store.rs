// src/config/store.rs
use crate::config::config::SessionConfig;
use crate::utils::error::MinerError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Persistence of the session configuration
pub trait ConfigStore: Send + Sync {
    /// Persists the given session configuration
    ///
    /// # Errors
    /// Returns `MinerError` if the configuration could not be written
    fn save(&self, config: &SessionConfig) -> Result<(), MinerError>;
}

/// TOML file backed [`ConfigStore`]
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    /// Creates a store persisting to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileConfigStore { path: path.into() }
    }

    /// Location of the session file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted session
    ///
    /// # Returns
    /// * `Ok(Some(config))` - A continuing session
    /// * `Ok(None)` - No session file yet, this is a first run
    /// * `Err(MinerError)` - The file exists but could not be read or parsed
    pub fn load(&self) -> Result<Option<SessionConfig>, MinerError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(MinerError::ConfigError(format!(
                    "Failed to read session at {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        toml::from_str(&contents)
            .map(Some)
            .map_err(|e| MinerError::ConfigError(format!("Invalid session format: {}", e)))
    }
}

impl ConfigStore for FileConfigStore {
    /// Writes through a sibling temporary file so a crash never leaves a
    /// truncated session behind
    fn save(&self, config: &SessionConfig) -> Result<(), MinerError> {
        let contents = toml::to_string_pretty(config)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;

        log::debug!("Session saved to {}", self.path.display());
        Ok(())
    }
}
