// Configuration merging with priority

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::loader::LeaConfig;

/// Partial configuration for merging
/// Uses Option<T> for all fields to support partial overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PartialConfig {
    pub data_dir: Option<PathBuf>,
    pub default_coach: Option<String>,
    pub max_recommendations: Option<usize>,
}

/// Configuration merger
/// Priority order: CLI -> File -> Defaults
pub struct ConfigMerger {
    defaults: LeaConfig,
    file: Option<LeaConfig>,
    cli: Option<PartialConfig>,
}

impl ConfigMerger {
    pub fn new() -> Self {
        Self {
            defaults: LeaConfig::default(),
            file: None,
            cli: None,
        }
    }

    pub fn with_file(mut self, config: Option<LeaConfig>) -> Self {
        self.file = config;
        self
    }

    pub fn with_cli(mut self, config: Option<PartialConfig>) -> Self {
        self.cli = config;
        self
    }

    /// Merge all configs with priority
    pub fn merge(&self) -> LeaConfig {
        let mut result = self.defaults.clone();

        if let Some(ref file) = self.file {
            result = LeaConfig {
                data_dir: file.data_dir.clone().or(result.data_dir),
                default_coach: file.default_coach.clone().or(result.default_coach),
                max_recommendations: file.max_recommendations,
            };
        }

        // CLI overrides (highest priority)
        if let Some(ref cli) = self.cli {
            result = LeaConfig {
                data_dir: cli.data_dir.clone().or(result.data_dir),
                default_coach: cli.default_coach.clone().or(result.default_coach),
                max_recommendations: cli.max_recommendations.unwrap_or(result.max_recommendations),
            };
        }

        result
    }
}

impl Default for ConfigMerger {
    fn default() -> Self {
        Self::new()
    }
}
