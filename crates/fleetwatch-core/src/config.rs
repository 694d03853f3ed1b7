//! Configuration loading for Fleetwatch

use crate::constants;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

fn default_database_path() -> PathBuf {
    constants::db_path()
}

fn default_bind_addr() -> String {
    constants::DEFAULT_BIND_ADDR.to_string()
}

fn default_sync_interval() -> u64 {
    constants::DEFAULT_SYNC_INTERVAL_SECS
}

fn default_sweep_interval() -> u64 {
    constants::DEFAULT_SWEEP_INTERVAL_SECS
}

/// Daemon configuration, loaded from `fleetwatch.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Webhook listen address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Roster sync interval in seconds
    #[serde(default = "default_sync_interval")]
    pub sync_interval_secs: u64,

    /// Timer sweep interval in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Telegram delivery settings
    pub telegram: Option<TelegramConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            bind_addr: default_bind_addr(),
            sync_interval_secs: default_sync_interval(),
            sweep_interval_secs: default_sweep_interval(),
            telegram: None,
        }
    }
}

/// Telegram bot settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token from @BotFather
    pub bot_token: String,
}

impl Config {
    /// Load config from the default path
    pub fn load() -> Result<Self> {
        Self::load_from(&constants::config_path())
    }

    /// Load config from a specific path, falling back to defaults when missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("Config not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;

        debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, &content)?;

        // Owner-only: the file carries the bot token
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)) {
                tracing::warn!("Failed to set config file permissions: {}", e);
            }
        }

        info!("Saved config to {:?}", path);
        Ok(())
    }
}
