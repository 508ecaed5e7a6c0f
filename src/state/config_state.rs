use crate::config::launcher_root_dir;
use crate::error::{AppError, Result};
use crate::utils::version_utils::{LoaderVersionPolicy, VersionWindow};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tokio::sync::{Mutex, RwLock};

const CONFIG_FILENAME: &str = "content_sync_config.json";
const CONFIG_CURRENT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default = "default_mods_watch_interval_ms")]
    pub mods_watch_interval_ms: u64,
    #[serde(default = "default_logs_refresh_interval_ms")]
    pub logs_refresh_interval_ms: u64,
    /// Used when the identity provider reports no poll interval.
    #[serde(default = "default_login_interval_secs")]
    pub login_default_interval_secs: u64,
    #[serde(default = "default_login_max_duration_secs")]
    pub login_max_duration_secs: u64,
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
    #[serde(default = "default_search_min_query_len")]
    pub search_min_query_len: usize,
    #[serde(default = "default_search_page_size")]
    pub search_page_size: u32,
    #[serde(default)]
    pub include_snapshots: bool,
    #[serde(default)]
    pub neoforge_window: VersionWindow,
}

fn default_config_version() -> u32 {
    CONFIG_CURRENT_VERSION
}

fn default_mods_watch_interval_ms() -> u64 {
    2000
}

fn default_logs_refresh_interval_ms() -> u64 {
    2000
}

fn default_login_interval_secs() -> u64 {
    5
}

fn default_login_max_duration_secs() -> u64 {
    900 // Microsoft device codes expire after 15 minutes
}

fn default_search_debounce_ms() -> u64 {
    300
}

fn default_search_min_query_len() -> usize {
    2
}

fn default_search_page_size() -> u32 {
    20
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_CURRENT_VERSION,
            mods_watch_interval_ms: default_mods_watch_interval_ms(),
            logs_refresh_interval_ms: default_logs_refresh_interval_ms(),
            login_default_interval_secs: default_login_interval_secs(),
            login_max_duration_secs: default_login_max_duration_secs(),
            search_debounce_ms: default_search_debounce_ms(),
            search_min_query_len: default_search_min_query_len(),
            search_page_size: default_search_page_size(),
            include_snapshots: false,
            neoforge_window: VersionWindow::default(),
        }
    }
}

impl SyncConfig {
    pub fn mods_watch_interval(&self) -> Duration {
        Duration::from_millis(self.mods_watch_interval_ms.max(1))
    }

    pub fn logs_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.logs_refresh_interval_ms.max(1))
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn version_policy(&self) -> LoaderVersionPolicy {
        LoaderVersionPolicy {
            neoforge: self.neoforge_window,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.search_page_size == 0 {
            return Err(AppError::Config("search_page_size must be greater than 0".to_string()));
        }
        let window = &self.neoforge_window;
        if window.floor > window.ceiling {
            return Err(AppError::Config(format!(
                "neoforge_window floor {:?} lies above ceiling {:?}",
                window.floor, window.ceiling
            )));
        }
        Ok(())
    }
}

pub fn default_config_path() -> PathBuf {
    launcher_root_dir().join(CONFIG_FILENAME)
}

pub struct ConfigManager {
    config: Arc<RwLock<SyncConfig>>,
    config_path: PathBuf,
    save_lock: Mutex<()>,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        info!(
            "ConfigManager: Initializing with path: {:?} (config loading deferred)",
            config_path
        );

        Self {
            config: Arc::new(RwLock::new(SyncConfig::default())),
            config_path,
            save_lock: Mutex::new(()),
        }
    }

    /// Loads the config file, writing defaults when none exists yet. An
    /// unreadable file is backed up and replaced by defaults in memory.
    pub async fn load(&self) -> Result<SyncConfig> {
        if !self.config_path.exists() {
            info!("Config file not found, using default configuration");
            self.save_config().await?;
            return Ok(self.get_config().await);
        }

        info!("Loading content sync configuration from: {:?}", self.config_path);
        let config_data = fs::read_to_string(&self.config_path).await?;

        let parsed = serde_json::from_str::<SyncConfig>(&config_data)
            .map_err(AppError::Json)
            .and_then(|config| config.validate().map(|_| config));

        match parsed {
            Ok(loaded_config) => {
                debug!("Loaded config: {:?}", loaded_config);
                *self.config.write().await = loaded_config.clone();
                Ok(loaded_config)
            }
            Err(e) => {
                error!("Failed to parse config file: {}", e);
                let backup_path = self.config_path.with_extension("json.backup");
                if let Err(backup_err) = fs::copy(&self.config_path, &backup_path).await {
                    warn!("Failed to create config backup: {}", backup_err);
                } else {
                    info!("Created config backup at: {:?}", backup_path);
                }
                Ok(self.get_config().await)
            }
        }
    }

    pub async fn get_config(&self) -> SyncConfig {
        self.config.read().await.clone()
    }

    pub async fn set_config(&self, new_config: SyncConfig) -> Result<()> {
        new_config.validate()?;
        *self.config.write().await = new_config;
        self.save_config().await
    }

    async fn save_config(&self) -> Result<()> {
        let _guard = self.save_lock.lock().await;

        if let Some(parent_dir) = self.config_path.parent() {
            if !parent_dir.exists() {
                fs::create_dir_all(parent_dir).await?;
            }
        }

        let config = self.config.read().await.clone();
        let config_data = serde_json::to_string_pretty(&config)?;
        fs::write(&self.config_path, config_data).await?;

        info!("Saved content sync configuration to: {:?}", self.config_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: SyncConfig = serde_json::from_str(r#"{ "search_page_size": 50 }"#).unwrap();
        assert_eq!(config.search_page_size, 50);
        assert_eq!(config.search_min_query_len, 2);
        assert_eq!(config.neoforge_window, VersionWindow::NEOFORGE);
        assert!(!config.include_snapshots);
    }

    #[test]
    fn test_inverted_window_is_rejected() {
        let config = SyncConfig {
            neoforge_window: VersionWindow {
                major: 1,
                floor: (21, 0),
                ceiling: (20, 4),
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
