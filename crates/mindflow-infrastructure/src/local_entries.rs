//! File-backed entry repository for local mode.
//!
//! One JSON file per identity under `entries/`, holding the full collection
//! as an array in the same camelCase wire shape the cloud record uses. The
//! whole collection is rewritten on save; collections are small enough that
//! per-entry files would buy nothing.

use crate::paths::{MindflowPaths, sanitize_identity};
use crate::storage::AtomicJsonFile;
use async_trait::async_trait;
use mindflow_core::{Entry, EntryRepository, MindflowError, Result};
use std::path::PathBuf;

/// Entry repository backed by per-identity atomic JSON files.
pub struct LocalEntryRepository {
    base_dir: PathBuf,
}

impl LocalEntryRepository {
    /// Creates a repository storing collections under `base_dir`.
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Creates a repository at the default on-device location.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(MindflowPaths::entries_dir()?))
    }

    fn file_for(&self, username: &str) -> AtomicJsonFile<Vec<Entry>> {
        AtomicJsonFile::new(
            self.base_dir
                .join(format!("{}.json", sanitize_identity(username))),
        )
    }
}

#[async_trait]
impl EntryRepository for LocalEntryRepository {
    async fn load(&self, username: &str) -> Result<Vec<Entry>> {
        let file = self.file_for(username);
        tokio::task::spawn_blocking(move || Ok(file.load()?.unwrap_or_default()))
            .await
            .map_err(|e| MindflowError::internal(format!("Failed to spawn blocking task: {}", e)))?
    }

    async fn save(&self, username: &str, entries: &[Entry]) -> Result<()> {
        let file = self.file_for(username);
        let entries = entries.to_vec();
        tokio::task::spawn_blocking(move || Ok(file.save(&entries)?))
            .await
            .map_err(|e| MindflowError::internal(format!("Failed to spawn blocking task: {}", e)))?
    }

    async fn remove(&self, username: &str) -> Result<()> {
        let file = self.file_for(username);
        tokio::task::spawn_blocking(move || Ok(file.remove()?))
            .await
            .map_err(|e| MindflowError::internal(format!("Failed to spawn blocking task: {}", e)))?
    }
}
