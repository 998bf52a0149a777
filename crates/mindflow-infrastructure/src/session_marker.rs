//! File-backed session marker.
//!
//! Persists the single current-identity marker so a restart resumes the last
//! signed-in view without re-prompting.

use crate::paths::MindflowPaths;
use crate::storage::AtomicJsonFile;
use async_trait::async_trait;
use mindflow_core::{MindflowError, Result, SessionMarkerRepository};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionMarker {
    username: String,
}

/// Session marker repository backed by a single JSON file.
pub struct FileSessionMarkerRepository {
    file: AtomicJsonFile<SessionMarker>,
}

impl FileSessionMarkerRepository {
    /// Creates a repository storing its marker at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicJsonFile::new(path),
        }
    }

    /// Creates a repository at the default on-device location.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(MindflowPaths::session_file()?))
    }

    async fn with_file<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(AtomicJsonFile<SessionMarker>) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || f(file))
            .await
            .map_err(|e| MindflowError::internal(format!("Failed to spawn blocking task: {}", e)))?
    }
}

#[async_trait]
impl SessionMarkerRepository for FileSessionMarkerRepository {
    async fn current(&self) -> Result<Option<String>> {
        self.with_file(|file| Ok(file.load()?.map(|marker| marker.username)))
            .await
    }

    async fn set(&self, username: &str) -> Result<()> {
        let marker = SessionMarker {
            username: username.to_string(),
        };
        self.with_file(move |file| Ok(file.save(&marker)?)).await
    }

    async fn clear(&self) -> Result<()> {
        self.with_file(|file| Ok(file.remove()?)).await
    }
}
