//! Default wiring for a desktop client.
//!
//! Builds the coordinator and journal service from the on-device
//! configuration: file-backed local stores at their default locations, plus
//! the cloud and analysis clients when configured.

use crate::journal::JournalService;
use crate::sync::SyncCoordinator;
use mindflow_core::{AnalysisService, RemoteStore, Result};
use mindflow_infrastructure::{
    ConfigService, FileSessionMarkerRepository, LocalCredentialRepository, LocalEntryRepository,
};
use mindflow_interaction::{CloudStoreClient, GeminiAnalysisService};
use std::sync::Arc;

/// Builds a coordinator over the default on-device stores.
///
/// The persisted `config.toml` decides the mode: a usable cloud
/// configuration wires the remote store, anything else runs local-only.
pub fn build_coordinator() -> Result<Arc<SyncCoordinator>> {
    let config = ConfigService::default_location()?.load()?;
    let remote: Option<Arc<dyn RemoteStore>> = config
        .is_usable()
        .then(|| Arc::new(CloudStoreClient::new(&config)) as Arc<dyn RemoteStore>);

    tracing::info!(cloud = remote.is_some(), "Building sync coordinator");

    Ok(Arc::new(SyncCoordinator::new(
        config,
        Arc::new(LocalCredentialRepository::default_location()?),
        Arc::new(LocalEntryRepository::default_location()?),
        Arc::new(FileSessionMarkerRepository::default_location()?),
        remote,
    )))
}

/// Builds the journal service on top of a coordinator.
pub fn build_journal_service(
    coordinator: Arc<SyncCoordinator>,
    gemini_api_key: impl Into<String>,
) -> JournalService {
    let analysis: Arc<dyn AnalysisService> = Arc::new(GeminiAnalysisService::new(gemini_api_key));
    JournalService::new(coordinator, analysis)
}
