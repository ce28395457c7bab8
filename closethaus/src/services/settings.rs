//! Settings service
//!
//! Manages runtime settings persistence using JSON file storage.

use crate::config::{
    DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS, MAX_REQUEST_TIMEOUT_SECS,
    MIN_REQUEST_TIMEOUT_SECS, SETTINGS_FILE_NAME,
};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;

/// Where the styling proxy lives and how long to wait for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSettings {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Request timeout in seconds, clamped to the accepted range on use
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl RemoteSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .clamp(MIN_REQUEST_TIMEOUT_SECS, MAX_REQUEST_TIMEOUT_SECS),
        )
    }
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Persistence behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Keep one in-flight write per collection, queueing later saves
    #[serde(default = "default_true")]
    pub serialize_saves: bool,
}

fn default_true() -> bool {
    true
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            serialize_saves: true,
        }
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppSettings {
    #[serde(default)]
    pub remote: RemoteSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Service for managing application settings
#[derive(Clone)]
pub struct SettingsService {
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new(app_data_dir: PathBuf) -> Self {
        Self {
            settings_path: app_data_dir.join(SETTINGS_FILE_NAME),
        }
    }

    /// Load settings from disk or create default if not exists.
    ///
    /// An unreadable file is left in place and defaults are used.
    pub async fn load(&self) -> Result<AppSettings> {
        if !self.settings_path.exists() {
            tracing::info!("Settings file not found, creating default settings");
            let default = AppSettings::default();
            self.save(&default).await?;
            return Ok(default);
        }

        let content = fs::read_to_string(&self.settings_path).await?;
        match serde_json::from_str::<AppSettings>(&content) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                tracing::warn!(
                    "Settings file {:?} is unreadable, using defaults: {}",
                    self.settings_path,
                    e
                );
                Ok(AppSettings::default())
            }
        }
    }

    /// Save settings to disk
    pub async fn save(&self, settings: &AppSettings) -> Result<()> {
        let content = serde_json::to_string_pretty(settings)
            .map_err(|e| AppError::Generic(format!("Failed to serialize settings: {}", e)))?;

        fs::write(&self.settings_path, content).await?;
        tracing::info!("Settings saved to {:?}", self.settings_path);

        Ok(())
    }

    /// Update remote service settings
    pub async fn update_remote(&self, remote: RemoteSettings) -> Result<()> {
        let mut settings = self.load().await?;
        settings.remote = remote;
        self.save(&settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_service() -> (SettingsService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let service = SettingsService::new(temp_dir.path().to_path_buf());
        (service, temp_dir)
    }

    #[tokio::test]
    async fn test_default_settings_created_on_load() {
        let (service, temp) = create_test_service();

        let settings = service.load().await.unwrap();

        assert_eq!(settings.remote.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(settings.remote.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert!(settings.storage.serialize_saves);
        assert!(temp.path().join(SETTINGS_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn test_partial_file_fills_defaults() {
        let (service, temp) = create_test_service();

        std::fs::write(
            temp.path().join(SETTINGS_FILE_NAME),
            r#"{ "remote": { "api_base_url": "http://styling.local" } }"#,
        )
        .unwrap();

        let settings = service.load().await.unwrap();
        assert_eq!(settings.remote.api_base_url, "http://styling.local");
        assert_eq!(settings.remote.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert!(settings.storage.serialize_saves);
    }

    #[tokio::test]
    async fn test_settings_persistence() {
        let temp_dir = TempDir::new().unwrap();
        let settings_path = temp_dir.path().to_path_buf();

        {
            let service = SettingsService::new(settings_path.clone());
            service
                .update_remote(RemoteSettings {
                    api_base_url: "http://10.0.0.2:9000".to_string(),
                    request_timeout_secs: 30,
                })
                .await
                .unwrap();
        }

        {
            let service = SettingsService::new(settings_path);
            let loaded = service.load().await.unwrap();
            assert_eq!(loaded.remote.api_base_url, "http://10.0.0.2:9000");
            assert_eq!(loaded.remote.request_timeout_secs, 30);
        }
    }

    #[test]
    fn test_request_timeout_is_clamped() {
        let remote = RemoteSettings {
            request_timeout_secs: 0,
            ..RemoteSettings::default()
        };
        assert_eq!(remote.request_timeout(), Duration::from_secs(MIN_REQUEST_TIMEOUT_SECS));

        let remote = RemoteSettings {
            request_timeout_secs: 86_400,
            ..RemoteSettings::default()
        };
        assert_eq!(remote.request_timeout(), Duration::from_secs(MAX_REQUEST_TIMEOUT_SECS));
    }

    #[tokio::test]
    async fn test_corrupt_settings_file_falls_back_to_defaults() {
        let (service, temp) = create_test_service();
        let path = temp.path().join(SETTINGS_FILE_NAME);
        std::fs::write(&path, "{ not json").unwrap();

        let settings = service.load().await.unwrap();

        assert_eq!(settings, AppSettings::default());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }
}
