//! Unified path management for on-device files.
//!
//! Everything the client persists lives under one per-user configuration
//! directory:
//!
//! ```text
//! ~/.config/mindflow/          # Linux; platform-equivalent elsewhere
//! ├── config.toml              # Cloud connection settings
//! ├── users.json               # Local-mode credential table
//! ├── session.json             # Persisted current-identity marker
//! └── entries/
//!     └── <identity>.json      # One entry collection per local identity
//! ```

use mindflow_core::{MindflowError, Result};
use std::path::PathBuf;

/// Unified path resolution for the client's on-device files.
pub struct MindflowPaths;

impl MindflowPaths {
    /// Returns the configuration directory (e.g. `~/.config/mindflow/`).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("mindflow"))
            .ok_or_else(|| MindflowError::config("Cannot determine config directory"))
    }

    /// Returns the path to the cloud connection settings file.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the local credential table.
    pub fn credentials_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("users.json"))
    }

    /// Returns the path to the persisted session marker.
    pub fn session_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("session.json"))
    }

    /// Returns the directory holding per-identity entry collections.
    pub fn entries_dir() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("entries"))
    }
}

/// Folds an identity into a safe lowercase file stem.
pub fn sanitize_identity(identity: &str) -> String {
    identity
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
