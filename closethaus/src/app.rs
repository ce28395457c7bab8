//! Application state and initialization
//!
//! This module manages the central application state and lifecycle.
//! All services are initialized here and made available through AppState.

use crate::config::DATABASE_FILE_NAME;
use crate::database::Repository;
use crate::error::Result;
use crate::remote::{HttpStylistApi, StylistApi, StylistClient};
use crate::services::{AppSettings, ClosetService, Coordinator, MirrorService, SettingsService};
use crate::storage::Store;
use std::path::PathBuf;
use std::sync::Arc;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub app_data_dir: PathBuf,
    pub settings: AppSettings,
    pub coordinator: Arc<Coordinator>,
    pub closet_service: ClosetService,
    pub mirror_service: Arc<MirrorService>,
}

impl AppState {
    /// Wire every service around one store and one styling transport.
    /// Nothing is loaded until [`Coordinator::initialize`] runs.
    pub fn new(app_data_dir: PathBuf, settings: AppSettings, api: Arc<dyn StylistApi>) -> Self {
        let store = Store::new(app_data_dir.join(DATABASE_FILE_NAME));
        let repo = Repository::new(store);
        let coordinator = Arc::new(Coordinator::new(repo, settings.storage.serialize_saves));

        let client = StylistClient::new(api);
        let closet_service = ClosetService::new(coordinator.clone(), client.clone());
        let mirror_service = Arc::new(MirrorService::new(coordinator.clone(), client));

        Self {
            app_data_dir,
            settings,
            coordinator,
            closet_service,
            mirror_service,
        }
    }
}

/// Application setup - called once on startup
pub async fn setup(app_data_dir: PathBuf) -> Result<AppState> {
    tracing::info!("Initializing application");
    tracing::info!("App data directory: {:?}", app_data_dir);

    std::fs::create_dir_all(&app_data_dir)?;

    let settings = SettingsService::new(app_data_dir.clone()).load().await?;

    let api = HttpStylistApi::new(
        &settings.remote.api_base_url,
        settings.remote.request_timeout(),
    )?;
    tracing::info!("Styling service at {}", api.base_url());

    let state = AppState::new(app_data_dir, settings, Arc::new(api));
    state.coordinator.initialize().await;

    tracing::info!("Application initialized successfully");

    Ok(state)
}
