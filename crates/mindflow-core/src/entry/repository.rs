//! Entry repository trait.
//!
//! Defines the interface for the on-device entry store: a keyed mapping from
//! username to that user's full entry collection. Collections are always read
//! and written whole; there is no per-entry delta path.

use super::model::Entry;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for per-user entry collections.
///
/// Implementations persist one collection per username. A user with no
/// stored collection reads as an empty collection, not an error.
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Loads the stored collection for a user.
    ///
    /// Returns an empty vector when nothing has been stored yet.
    async fn load(&self, username: &str) -> Result<Vec<Entry>>;

    /// Replaces the stored collection for a user with `entries`.
    async fn save(&self, username: &str, entries: &[Entry]) -> Result<()>;

    /// Permanently removes the stored collection for a user.
    ///
    /// Removing a user that has no stored collection is not an error.
    async fn remove(&self, username: &str) -> Result<()>;
}
