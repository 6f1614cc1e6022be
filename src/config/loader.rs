// Configuration file loading

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::file_storage::FileStorage;

/// LEA configuration (`~/.lea/config.toml`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaConfig {
    /// Where sessions and versions are stored; defaults to `~/.lea`
    #[serde(rename = "dataDir", alias = "data_dir", default)]
    pub data_dir: Option<PathBuf>,
    /// Coach name filled into fresh sessions
    #[serde(rename = "defaultCoach", alias = "default_coach", default)]
    pub default_coach: Option<String>,
    /// Maximum number of techniques the summary recommends
    #[serde(
        rename = "maxRecommendations",
        alias = "max_recommendations",
        default = "default_max_recommendations"
    )]
    pub max_recommendations: usize,
}

fn default_max_recommendations() -> usize { 3 }

impl Default for LeaConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            default_coach: None,
            max_recommendations: default_max_recommendations(),
        }
    }
}

impl LeaConfig {
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(FileStorage::default_dir)
    }
}

/// Configuration loader
pub struct ConfigLoader {
    path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Loader for the default location
    pub fn new() -> Self {
        Self {
            path: Self::default_config_path(),
        }
    }

    pub fn with_path(path: &Path) -> Self {
        Self {
            path: Some(path.to_path_buf()),
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".lea").join("config.toml"))
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load the configured file, `None` when it does not exist
    pub fn load(&self) -> DiscoveryResult<Option<LeaConfig>> {
        match self.path {
            Some(ref path) => Self::load_from_path(path),
            None => Ok(None),
        }
    }

    /// Load config from a specific path
    pub fn load_from_path(path: &Path) -> DiscoveryResult<Option<LeaConfig>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            DiscoveryError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        let config: LeaConfig = toml::from_str(&contents).map_err(|e| {
            DiscoveryError::Config(format!("Failed to parse config file '{}': {}", path.display(), e))
        })?;

        validate_config(&config)?;
        log::debug!("Loaded config from: {}", path.display());

        Ok(Some(config))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate config values
pub fn validate_config(config: &LeaConfig) -> DiscoveryResult<()> {
    if config.max_recommendations == 0 {
        return Err(DiscoveryError::Config(
            "maxRecommendations must be greater than 0".to_string(),
        ));
    }
    Ok(())
}
