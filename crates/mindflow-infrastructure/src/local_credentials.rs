//! File-backed credential repository for local mode.
//!
//! Stores one JSON table of `{username, salt, hash}` records. The secret is
//! never stored; only `base64(sha256(salt || password))` with a random
//! 16-byte salt per record. Lookups fold case, the registered casing is the
//! canonical identity.

use crate::paths::MindflowPaths;
use crate::storage::AtomicJsonFile;
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use mindflow_core::{AuthFailure, CredentialRepository, MindflowError, Result};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCredential {
    username: String,
    /// Base64-encoded random salt.
    salt: String,
    /// Base64-encoded sha256(salt || password).
    hash: String,
}

impl StoredCredential {
    fn create(username: &str, password: &str) -> Self {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        Self {
            username: username.to_string(),
            salt: BASE64.encode(salt),
            hash: hash_password(&salt, password),
        }
    }

    fn verify(&self, password: &str) -> bool {
        let Ok(salt) = BASE64.decode(&self.salt) else {
            return false;
        };
        hash_password(&salt, password) == self.hash
    }
}

fn hash_password(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    BASE64.encode(hasher.finalize())
}

/// Credential repository backed by an atomic JSON table on disk.
pub struct LocalCredentialRepository {
    file: AtomicJsonFile<Vec<StoredCredential>>,
}

impl LocalCredentialRepository {
    /// Creates a repository storing its table at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicJsonFile::new(path),
        }
    }

    /// Creates a repository at the default on-device location.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(MindflowPaths::credentials_file()?))
    }

    async fn with_file<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(AtomicJsonFile<Vec<StoredCredential>>) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || f(file))
            .await
            .map_err(|e| MindflowError::internal(format!("Failed to spawn blocking task: {}", e)))?
    }
}

#[async_trait]
impl CredentialRepository for LocalCredentialRepository {
    async fn register(&self, username: &str, password: &str) -> Result<()> {
        let username = username.to_string();
        let password = password.to_string();
        self.with_file(move |file| {
            let mut outcome = Ok(());
            file.update(Vec::new(), |table| {
                if table
                    .iter()
                    .any(|c| c.username.eq_ignore_ascii_case(&username))
                {
                    outcome = Err(AuthFailure::DuplicateIdentity(username.clone()).into());
                    return Ok(());
                }
                table.push(StoredCredential::create(&username, &password));
                Ok(())
            })?;
            outcome
        })
        .await
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<String> {
        let username = username.to_string();
        let password = password.to_string();
        self.with_file(move |file| {
            let table = file.load()?.unwrap_or_default();
            table
                .iter()
                .find(|c| c.username.eq_ignore_ascii_case(&username))
                .filter(|c| c.verify(&password))
                .map(|c| c.username.clone())
                .ok_or_else(|| AuthFailure::InvalidCredentials.into())
        })
        .await
    }

    async fn change_password(&self, username: &str, current: &str, new: &str) -> Result<()> {
        let username = username.to_string();
        let current = current.to_string();
        let new = new.to_string();
        self.with_file(move |file| {
            let mut outcome = Ok(());
            file.update(Vec::new(), |table| {
                let Some(record) = table
                    .iter_mut()
                    .find(|c| c.username.eq_ignore_ascii_case(&username))
                else {
                    outcome = Err(AuthFailure::InvalidCredentials.into());
                    return Ok(());
                };
                if !record.verify(&current) {
                    outcome = Err(AuthFailure::InvalidCredentials.into());
                    return Ok(());
                }
                let canonical = record.username.clone();
                *record = StoredCredential::create(&canonical, &new);
                Ok(())
            })?;
            outcome
        })
        .await
    }

    async fn remove(&self, username: &str) -> Result<()> {
        let username = username.to_string();
        self.with_file(move |file| {
            file.update(Vec::new(), |table| {
                table.retain(|c| !c.username.eq_ignore_ascii_case(&username));
                Ok(())
            })?;
            Ok(())
        })
        .await
    }

    async fn exists(&self, username: &str) -> Result<bool> {
        let username = username.to_string();
        self.with_file(move |file| {
            let table = file.load()?.unwrap_or_default();
            Ok(table
                .iter()
                .any(|c| c.username.eq_ignore_ascii_case(&username)))
        })
        .await
    }
}
