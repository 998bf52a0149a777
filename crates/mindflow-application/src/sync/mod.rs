//! Sync coordination: login-time reconciliation and optimistic writes.

pub mod coordinator;
pub mod merge;

pub use coordinator::SyncCoordinator;
pub use merge::{MergeOutcome, MergeSource, reconcile};
