//! Credential repository trait (local mode).
//!
//! Local mode keeps an on-device credential table keyed by username. Only a
//! salted hash of the secret is ever stored; verification compares hashes.

use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for local identity/credential pairs.
///
/// Usernames compare case-insensitively on lookup, but the casing used at
/// registration is preserved and returned as the canonical identity.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Registers a new identity.
    ///
    /// Fails with [`AuthFailure::DuplicateIdentity`](crate::error::AuthFailure)
    /// when the username (compared case-insensitively) is already taken.
    async fn register(&self, username: &str, password: &str) -> Result<()>;

    /// Verifies a credential pair.
    ///
    /// Returns the canonical (as-registered) username on success, and
    /// [`AuthFailure::InvalidCredentials`](crate::error::AuthFailure) when
    /// the identity is unknown or the secret does not verify.
    async fn authenticate(&self, username: &str, password: &str) -> Result<String>;

    /// Replaces the stored hash after verifying the current secret.
    async fn change_password(&self, username: &str, current: &str, new: &str) -> Result<()>;

    /// Permanently erases the credential record. Unrecoverable.
    async fn remove(&self, username: &str) -> Result<()>;

    /// Whether an identity is registered (case-insensitive).
    async fn exists(&self, username: &str) -> Result<bool>;
}
