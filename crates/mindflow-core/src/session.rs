//! Session marker repository trait.
//!
//! A single "current session identity" marker persists across restarts so
//! the client can resume the last signed-in user's view. At most one
//! identity is active per client instance.

use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for the persisted current-user marker.
#[async_trait]
pub trait SessionMarkerRepository: Send + Sync {
    /// Returns the persisted current identity, if any.
    async fn current(&self) -> Result<Option<String>>;

    /// Records `username` as the current identity.
    async fn set(&self, username: &str) -> Result<()>;

    /// Clears the marker. Clearing an absent marker is not an error.
    async fn clear(&self) -> Result<()>;
}
