//! Configuration management for awsbastion

pub mod schema;

pub use schema::Config;

use crate::error::{BastionError, BastionResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Environment variable overriding the credential cache location
pub const CACHE_FILE_ENV: &str = "AWSBASTION_CACHE_FILE";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("awsbastion")
            .join("config.toml")
    }

    /// Default credential cache file, a dotfile in the home directory
    pub fn default_cache_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".awsbastion_session.json")
    }

    /// Resolve the cache file: explicit path, then env, then config, then default
    pub fn cache_path(explicit: Option<&Path>, config: &Config) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }

        if let Ok(path) = std::env::var(CACHE_FILE_ENV) {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }

        config
            .cache
            .path
            .clone()
            .unwrap_or_else(Self::default_cache_path)
    }

    /// Load configuration, falling back to defaults if not exists
    pub async fn load(&self) -> BastionResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> BastionResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| BastionError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| BastionError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> BastionResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            BastionError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    async fn ensure_config_dir(&self) -> BastionResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| BastionError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
