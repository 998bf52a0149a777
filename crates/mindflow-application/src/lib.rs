//! Application layer for MindFlow.
//!
//! Use cases coordinating the domain and infrastructure layers: the sync
//! coordinator owning session state and the active collection, and the
//! journal service the presentation calls.

pub mod bootstrap;
pub mod journal;
pub mod sync;

pub use bootstrap::{build_coordinator, build_journal_service};
pub use journal::{JournalService, JournalStats};
pub use sync::SyncCoordinator;
