//! Cloud configuration persistence.
//!
//! Reads and writes the `config.toml` holding [`CloudConfig`]. A missing
//! file yields the shipped default so a fresh install starts in cloud mode
//! against the hosted project.

use crate::paths::MindflowPaths;
use crate::storage::AtomicTomlFile;
use mindflow_core::{CloudConfig, Result};
use std::path::PathBuf;

/// Loads and saves the cloud connection settings.
pub struct ConfigService {
    file: AtomicTomlFile<CloudConfig>,
}

impl ConfigService {
    /// Creates a service storing its settings at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
        }
    }

    /// Creates a service at the default on-device location.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(MindflowPaths::config_file()?))
    }

    /// Loads the settings, falling back to the shipped default.
    pub fn load(&self) -> Result<CloudConfig> {
        Ok(self.file.load()?.unwrap_or_default())
    }

    /// Saves the settings atomically.
    pub fn save(&self, config: &CloudConfig) -> Result<()> {
        Ok(self.file.save(config)?)
    }
}
