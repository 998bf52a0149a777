//! Atomic JSON file operations.
//!
//! Same guarantees as [`AtomicTomlFile`](super::AtomicTomlFile), for the
//! JSON documents (credential table, entry collections, session marker)
//! whose wire shape must match the cloud record blob.

use super::{FileLock, StorageError, write_atomic};
use serde::{Serialize, de::DeserializeOwned};
use std::fs;
use std::marker::PhantomData;
use std::path::PathBuf;

/// A handle to a JSON file with atomic update semantics.
///
/// - **Atomicity**: Updates are all-or-nothing via tmp file + atomic rename
/// - **Isolation**: File locking serializes concurrent updates
/// - **Durability**: Explicit fsync before rename
pub struct AtomicJsonFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> Clone for AtomicJsonFile<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T> AtomicJsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates a new atomic JSON file handle.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    /// Loads the file and deserializes it.
    ///
    /// A missing or empty file reads as `None`.
    pub fn load(&self) -> Result<Option<T>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        let data: T = serde_json::from_str(&content)?;
        Ok(Some(data))
    }

    /// Saves data atomically.
    pub fn save(&self, data: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(data)?;
        write_atomic(&self.path, json.as_bytes())
    }

    /// Removes the file. Removing an absent file is not an error.
    pub fn remove(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Performs a transactional update under an exclusive file lock.
    ///
    /// The closure receives the current data (or `default_value` when the
    /// file does not exist) and its result is written back atomically.
    pub fn update<F>(&self, default_value: T, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut T) -> Result<(), StorageError>,
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut data = self.load()?.unwrap_or(default_value);
        f(&mut data)?;
        self.save(&data)?;

        Ok(())
    }
}
