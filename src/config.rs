//! Application configuration management.
//!
//! A small persisted configuration supplies defaults for the behavior flags:
//! whether symlinks to regular files are followed, and where temporary
//! sorted runs are written. The file is JSON in the platform config
//! directory; a missing or malformed file falls back to defaults. CLI flags
//! always win over configured values.

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::cli::Cli;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Follow symbolic links that point to regular files.
    #[serde(default = "default_follow_symlinks")]
    pub follow_symlinks: bool,

    /// Directory for temporary sorted runs. `None` selects the OS temp
    /// directory.
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

fn default_follow_symlinks() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            follow_symlinks: true,
            temp_dir: None,
        }
    }
}

impl Config {
    /// Load the configuration from the default platform-specific path.
    pub fn load() -> Self {
        match Self::load_internal() {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    fn load_internal() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save the configuration to the default platform-specific path.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "dupescan", "dupescan")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
        Ok(project_dirs.config_dir().join("config.json"))
    }

    /// Merge explicit CLI flags into this configuration.
    pub fn merge_cli(&mut self, cli: &Cli) {
        if let Some(follow) = cli.follow_symlinks() {
            self.follow_symlinks = follow;
        }
        if let Some(dir) = &cli.temp_dir {
            self.temp_dir = Some(dir.clone());
        }
    }

    /// The effective temp directory for sorted runs.
    #[must_use]
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
