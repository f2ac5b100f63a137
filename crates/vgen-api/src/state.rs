//! Application state.

use std::sync::Arc;

use vgen_provider::{ProviderClient, ProviderConfig};
use vgen_store::{CharacterStore, JobStore, SnapshotStore};

use crate::config::ApiConfig;
use crate::error::ApiResult;

/// Shared application state.
///
/// Stores are explicitly constructed here and injected into the services;
/// nothing holds an ambient global handle.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub provider: Arc<ProviderClient>,
    pub jobs: Arc<JobStore>,
    pub characters: Arc<CharacterStore>,
    pub snapshots: Arc<SnapshotStore>,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: ApiConfig, provider_config: ProviderConfig) -> ApiResult<Self> {
        let provider = ProviderClient::new(provider_config)?;
        let jobs = JobStore::open(config.jobs_path()).await?;
        let characters =
            CharacterStore::open(config.characters_path(), config.lock_images_dir()).await?;
        let snapshots = SnapshotStore::open(config.snapshots_path()).await?;

        Ok(Self {
            config,
            provider: Arc::new(provider),
            jobs: Arc::new(jobs),
            characters: Arc::new(characters),
            snapshots: Arc::new(snapshots),
        })
    }

    /// Secret required by the gate, if one is configured.
    pub fn gate_secret(&self) -> Option<&str> {
        self.config.shared_secret.as_deref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
