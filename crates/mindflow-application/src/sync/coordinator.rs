//! Sync coordinator.
//!
//! The single owner of session state and the active entry collection. Every
//! mutation in the client funnels through [`SyncCoordinator::mutate`], which
//! applies the optimistic write discipline: memory first, persistence
//! second, no rollback. Which store backs persistence is decided once at
//! construction from the cloud configuration; changing the configuration
//! means building a new coordinator.

use crate::sync::merge::{MergeSource, reconcile};
use mindflow_core::{
    AuthFailure, AuthPhase, CloudConfig, CredentialRepository, Entry, EntryRepository,
    MindflowError, RegisterOutcome, RemoteStore, Result, SessionMarkerRepository,
    sort_newest_first, starter_entries,
};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct ActiveState {
    user: Option<String>,
    entries: Vec<Entry>,
    phase: AuthPhase,
}

/// Coordinates auth, the persisted stores, and the in-memory collection.
pub struct SyncCoordinator {
    config: CloudConfig,
    credentials: Arc<dyn CredentialRepository>,
    entry_store: Arc<dyn EntryRepository>,
    session_marker: Arc<dyn SessionMarkerRepository>,
    /// Present exactly when the configuration selects cloud mode.
    remote: Option<Arc<dyn RemoteStore>>,
    state: RwLock<ActiveState>,
}

impl SyncCoordinator {
    /// Creates a coordinator.
    ///
    /// `remote` is ignored unless the configuration is usable, so a caller
    /// can wire the client unconditionally and let the config decide.
    pub fn new(
        config: CloudConfig,
        credentials: Arc<dyn CredentialRepository>,
        entry_store: Arc<dyn EntryRepository>,
        session_marker: Arc<dyn SessionMarkerRepository>,
        remote: Option<Arc<dyn RemoteStore>>,
    ) -> Self {
        let remote = if config.is_usable() { remote } else { None };
        Self {
            config,
            credentials,
            entry_store,
            session_marker,
            remote,
            state: RwLock::new(ActiveState::default()),
        }
    }

    /// Whether persistence targets the cloud store.
    pub fn is_cloud(&self) -> bool {
        self.remote.is_some()
    }

    /// The configuration the coordinator was built from.
    pub fn config(&self) -> &CloudConfig {
        &self.config
    }

    /// Restores the previous session from the persisted marker, if any.
    ///
    /// With a marker present the user's collection is loaded from the active
    /// store; a store failure degrades to an empty collection with a warning
    /// rather than blocking startup.
    pub async fn resolve_session(&self) -> Result<()> {
        let Some(user) = self.session_marker.current().await? else {
            return Ok(());
        };

        let entries = match &self.remote {
            Some(remote) if remote.has_session().await => {
                remote.fetch_entries().await.unwrap_or_else(|e| {
                    tracing::warn!("Failed to restore cloud collection: {}", e);
                    Vec::new()
                })
            }
            Some(_) => {
                // The access token does not survive a restart; fall back to
                // the local cache until the next sign-in refreshes it.
                self.entry_store.load(&user).await.unwrap_or_else(|e| {
                    tracing::warn!("Failed to load cached collection: {}", e);
                    Vec::new()
                })
            }
            None => self.entry_store.load(&user).await.unwrap_or_else(|e| {
                tracing::warn!("Failed to load local collection: {}", e);
                Vec::new()
            }),
        };

        tracing::debug!(user = %user, count = entries.len(), "Restored session");
        self.install_session(user, entries).await;
        Ok(())
    }

    /// Registers a new identity.
    ///
    /// Cloud mode may yield [`RegisterOutcome::ConfirmationRequired`], in
    /// which case the coordinator stays unauthenticated until the user
    /// confirms out of band and signs in. Local mode seeds the fresh account
    /// with the starter collection.
    pub async fn register(&self, identity: &str, password: &str) -> Result<RegisterOutcome> {
        match &self.remote {
            Some(remote) => match remote.sign_up(identity, password).await? {
                RegisterOutcome::ConfirmationRequired => {
                    self.state.write().await.phase = AuthPhase::AwaitingConfirmation;
                    Ok(RegisterOutcome::ConfirmationRequired)
                }
                RegisterOutcome::SignedIn => {
                    self.complete_cloud_sign_in(identity).await?;
                    Ok(RegisterOutcome::SignedIn)
                }
            },
            None => {
                self.credentials.register(identity, password).await?;
                let mut seed = starter_entries();
                sort_newest_first(&mut seed);
                self.entry_store.save(identity, &seed).await?;
                self.session_marker.set(identity).await?;
                self.install_session(identity.to_string(), seed).await;
                Ok(RegisterOutcome::SignedIn)
            }
        }
    }

    /// Signs in and runs the reconciliation merge.
    pub async fn login(&self, identity: &str, password: &str) -> Result<()> {
        match &self.remote {
            Some(remote) => {
                remote.sign_in(identity, password).await?;
                self.complete_cloud_sign_in(identity).await
            }
            None => {
                let canonical = self.credentials.authenticate(identity, password).await?;
                let mut entries = self.entry_store.load(&canonical).await?;
                sort_newest_first(&mut entries);
                self.session_marker.set(&canonical).await?;
                self.install_session(canonical, entries).await;
                Ok(())
            }
        }
    }

    /// Merge step shared by cloud login and immediate cloud registration.
    async fn complete_cloud_sign_in(&self, identity: &str) -> Result<()> {
        let remote = self.remote.as_ref().ok_or_else(|| {
            MindflowError::internal("complete_cloud_sign_in without a remote store")
        })?;

        let cloud = remote.fetch_entries().await.unwrap_or_else(|e| {
            tracing::warn!("Cloud fetch during sign-in failed: {}", e);
            Vec::new()
        });
        let local = self.entry_store.load(identity).await.unwrap_or_else(|e| {
            tracing::warn!("Local cache read during sign-in failed: {}", e);
            Vec::new()
        });

        let outcome = reconcile(cloud, local);
        tracing::debug!(source = ?outcome.source, count = outcome.entries.len(), "Reconciled collections");

        if outcome.needs_upload {
            if let Err(e) = remote.upsert_entries(&outcome.entries).await {
                // Local data stays active; the next successful write syncs it.
                tracing::warn!("Upload of local collection failed: {}", e);
            }
        }
        if outcome.source == MergeSource::Cloud {
            if let Err(e) = self.entry_store.save(identity, &outcome.entries).await {
                tracing::warn!("Refreshing local cache failed: {}", e);
            }
        }

        self.session_marker.set(identity).await?;
        self.install_session(identity.to_string(), outcome.entries).await;
        Ok(())
    }

    /// Ends the session. Remote sign-out is best effort; the marker and the
    /// in-memory state are cleared unconditionally.
    pub async fn logout(&self) -> Result<()> {
        if let Some(remote) = &self.remote {
            if let Err(e) = remote.sign_out().await {
                tracing::warn!("Cloud sign-out failed: {}", e);
            }
        }
        if let Err(e) = self.session_marker.clear().await {
            tracing::warn!("Clearing session marker failed: {}", e);
        }
        *self.state.write().await = ActiveState::default();
        Ok(())
    }

    /// Replaces the active collection, optimistically.
    ///
    /// Memory is updated first and never rolled back; a persistence failure
    /// comes back as the error, with the new collection still active.
    pub async fn mutate(&self, mut new_collection: Vec<Entry>) -> Result<()> {
        sort_newest_first(&mut new_collection);

        let user = {
            let mut state = self.state.write().await;
            let user = state
                .user
                .clone()
                .ok_or::<MindflowError>(AuthFailure::NotSignedIn.into())?;
            state.entries = new_collection.clone();
            user
        };

        let local_result = self.entry_store.save(&user, &new_collection).await;
        let remote_result = match &self.remote {
            Some(remote) => remote.upsert_entries(&new_collection).await,
            None => Ok(()),
        };

        if let Err(e) = &local_result {
            tracing::warn!("Local persistence failed after optimistic update: {}", e);
        }
        if let Err(e) = &remote_result {
            tracing::warn!("Cloud persistence failed after optimistic update: {}", e);
        }
        local_result.and(remote_result)
    }

    /// Permanently deactivates the account.
    ///
    /// Cloud mode writes the tombstone and signs out; local mode erases the
    /// credential record and the entry file. Session state is cleared in
    /// every branch, even when a store write fails.
    pub async fn deactivate_account(&self) -> Result<()> {
        let user = self
            .state
            .read()
            .await
            .user
            .clone()
            .ok_or::<MindflowError>(AuthFailure::NotSignedIn.into())?;

        let result = match &self.remote {
            Some(remote) => {
                let tombstone_result = remote.write_tombstone().await;
                if let Err(e) = remote.sign_out().await {
                    tracing::warn!("Cloud sign-out after deactivation failed: {}", e);
                }
                if let Err(e) = self.entry_store.remove(&user).await {
                    tracing::warn!("Dropping cached collection failed: {}", e);
                }
                tombstone_result
            }
            None => {
                let credential_result = self.credentials.remove(&user).await;
                if let Err(e) = &credential_result {
                    tracing::warn!("Removing credential record failed: {}", e);
                }
                let entry_result = self.entry_store.remove(&user).await;
                if let Err(e) = &entry_result {
                    tracing::warn!("Removing entry collection failed: {}", e);
                }
                credential_result.and(entry_result)
            }
        };

        if let Err(e) = self.session_marker.clear().await {
            tracing::warn!("Clearing session marker failed: {}", e);
        }
        *self.state.write().await = ActiveState::default();
        result
    }

    /// Replaces the local credential after verifying the current one.
    ///
    /// Local mode only; cloud identities change their password through the
    /// account service's own flow.
    pub async fn change_password(&self, current: &str, new: &str) -> Result<()> {
        if self.remote.is_some() {
            return Err(AuthFailure::Rejected(
                "Password changes for cloud accounts go through the account service".to_string(),
            )
            .into());
        }
        let user = self
            .state
            .read()
            .await
            .user
            .clone()
            .ok_or::<MindflowError>(AuthFailure::NotSignedIn.into())?;
        self.credentials.change_password(&user, current, new).await
    }

    /// The active collection, newest first.
    pub async fn entries(&self) -> Vec<Entry> {
        self.state.read().await.entries.clone()
    }

    /// The signed-in identity, if any.
    pub async fn current_user(&self) -> Option<String> {
        self.state.read().await.user.clone()
    }

    /// The auth state machine's current phase.
    pub async fn phase(&self) -> AuthPhase {
        self.state.read().await.phase
    }

    async fn install_session(&self, user: String, entries: Vec<Entry>) {
        let mut state = self.state.write().await;
        state.user = Some(user);
        state.entries = entries;
        state.phase = AuthPhase::Authenticated;
    }
}
