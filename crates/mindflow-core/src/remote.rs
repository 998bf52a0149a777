//! Remote store port (cloud mode).
//!
//! In cloud mode the account service owns identity and the record service
//! owns the persisted entry collection, one row per user. The client treats
//! both through this single trait; the implementation carries whatever
//! session token the account service issued.

use crate::auth::RegisterOutcome;
use crate::entry::Entry;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract client for the hosted account and record service.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Creates a remote account.
    ///
    /// Returns [`RegisterOutcome::ConfirmationRequired`] when the service
    /// created the account but withheld a session pending out-of-band
    /// confirmation; [`RegisterOutcome::SignedIn`] when a session was issued
    /// immediately.
    async fn sign_up(&self, identity: &str, password: &str) -> Result<RegisterOutcome>;

    /// Opens a session for an existing account.
    async fn sign_in(&self, identity: &str, password: &str) -> Result<()>;

    /// Ends the current session. Idempotent.
    async fn sign_out(&self) -> Result<()>;

    /// Fetches the caller's full entry collection.
    ///
    /// A missing row and a deactivation tombstone both read as an empty
    /// collection.
    async fn fetch_entries(&self) -> Result<Vec<Entry>>;

    /// Replaces the caller's entry collection verbatim.
    async fn upsert_entries(&self, entries: &[Entry]) -> Result<()>;

    /// Overwrites the caller's row with a deactivation tombstone.
    async fn write_tombstone(&self) -> Result<()>;

    /// Whether a session is currently held.
    async fn has_session(&self) -> bool;
}
