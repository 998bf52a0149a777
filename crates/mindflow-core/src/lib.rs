//! Domain layer for the MindFlow journaling client.
//!
//! This crate carries the entry and auth domain models, the ports the
//! application layer depends on (credential, session-marker, entry, remote
//! store, and analysis traits), the shared error taxonomy, and pure derived
//! computations (streaks, search, distributions). It has no IO of its own.

pub mod analysis;
pub mod auth;
pub mod config;
pub mod entry;
pub mod error;
pub mod remote;
pub mod session;
pub mod stats;

// Re-export common error type
pub use error::{AuthFailure, MindflowError, Result};

pub use analysis::{AnalysisInput, AnalysisService, EntryAnnotation};
pub use auth::{AuthPhase, CredentialRepository, RegisterOutcome};
pub use config::CloudConfig;
pub use entry::{Emotion, Entry, EntryRepository, filter_entries, sort_newest_first, starter_entries};
pub use remote::RemoteStore;
pub use session::SessionMarkerRepository;
