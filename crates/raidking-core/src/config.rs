//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which holds an optional data directory override and the last raid table
//! the user had open.
//!
//! Configuration is stored at `~/.config/raidking/config.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::TableId;

/// Application name used for config/data directory paths
const APP_NAME: &str = "raidking";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable that overrides the data directory
pub const DATA_DIR_ENV: &str = "RAIDKING_DATA_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub last_table: Option<TableId>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Location of the config file
    pub fn path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the guild document and logs.
    ///
    /// `RAIDKING_DATA_DIR` wins over the configured `data_dir`, which wins
    /// over the platform data directory.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let env_override = std::env::var_os(DATA_DIR_ENV).map(PathBuf::from);
        self.resolve_data_dir(env_override)
    }

    fn resolve_data_dir(&self, env_override: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = env_override.filter(|d| !d.as_os_str().is_empty()) {
            return Ok(dir);
        }
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}
