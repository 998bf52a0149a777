//! Storage layer for atomic file operations.

mod atomic_json;
mod atomic_toml;

pub use atomic_json::AtomicJsonFile;
pub use atomic_toml::AtomicTomlFile;

use mindflow_core::MindflowError;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// Errors that can occur during atomic file operations.
#[derive(Debug)]
pub enum StorageError {
    /// File I/O error.
    Io(std::io::Error),
    /// JSON serialization/deserialization error.
    Json(serde_json::Error),
    /// TOML deserialization error.
    TomlDe(toml::de::Error),
    /// TOML serialization error.
    TomlSer(toml::ser::Error),
    /// File locking error.
    Lock(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {}", e),
            StorageError::Json(e) => write!(f, "JSON error: {}", e),
            StorageError::TomlDe(e) => write!(f, "TOML parse error: {}", e),
            StorageError::TomlSer(e) => write!(f, "TOML serialization error: {}", e),
            StorageError::Lock(e) => write!(f, "Lock error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Json(e)
    }
}

impl From<toml::de::Error> for StorageError {
    fn from(e: toml::de::Error) -> Self {
        StorageError::TomlDe(e)
    }
}

impl From<toml::ser::Error> for StorageError {
    fn from(e: toml::ser::Error) -> Self {
        StorageError::TomlSer(e)
    }
}

impl From<StorageError> for MindflowError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Io(e) => MindflowError::Io {
                message: e.to_string(),
            },
            StorageError::Json(e) => MindflowError::Serialization {
                format: "JSON".to_string(),
                message: e.to_string(),
            },
            StorageError::TomlDe(e) => MindflowError::Serialization {
                format: "TOML".to_string(),
                message: e.to_string(),
            },
            StorageError::TomlSer(e) => MindflowError::Serialization {
                format: "TOML".to_string(),
                message: e.to_string(),
            },
            StorageError::Lock(message) => MindflowError::Persistence(message),
        }
    }
}

/// A file lock guard that automatically releases the lock when dropped.
pub(crate) struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    /// Acquires an exclusive lock on a sibling `.lock` file for `path`.
    pub(crate) fn acquire(path: &Path) -> Result<Self, StorageError> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| StorageError::Lock(format!("Failed to acquire lock: {}", e)))?;
        }

        #[cfg(not(unix))]
        {
            // No file locking on non-Unix systems; acceptable for a
            // single-user desktop client.
        }

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Unlock is automatic when the file handle is dropped.
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// Writes `bytes` to `path` via a temporary sibling file, fsync, and rename.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    use std::io::Write as IoWrite;

    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let parent = path.parent().ok_or_else(|| {
        StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Path has no parent directory",
        ))
    })?;
    let file_name = path.file_name().ok_or_else(|| {
        StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Path has no file name",
        ))
    })?;

    let tmp_path = parent.join(format!(".{}.tmp", file_name.to_string_lossy()));
    let mut tmp_file = File::create(&tmp_path)?;
    tmp_file.write_all(bytes)?;
    tmp_file.sync_all()?;
    drop(tmp_file);

    fs::rename(&tmp_path, path)?;

    Ok(())
}
