//! On-device persistence for the MindFlow client.
//!
//! File-backed implementations of the domain ports: atomic JSON/TOML
//! storage, the local credential table, per-identity entry collections, the
//! session marker, and cloud configuration loading.

pub mod config_service;
pub mod local_credentials;
pub mod local_entries;
pub mod paths;
pub mod session_marker;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::local_credentials::LocalCredentialRepository;
pub use crate::local_entries::LocalEntryRepository;
pub use crate::paths::MindflowPaths;
pub use crate::session_marker::FileSessionMarkerRepository;
