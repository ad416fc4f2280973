//! Configuration handling for the outline CLI
//!
//! Configuration is read from `--config <PATH>` (or `$OUTLINE_CONFIG`) when
//! given, otherwise from `~/.config/outline/config.toml` when present.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interchange::ImportConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// How outlines are printed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Spaces per indent level
    pub indent_width: usize,

    /// Print start and finish dates next to each task
    pub show_dates: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            indent_width: 2,
            show_dates: true,
        }
    }
}

/// Combined configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Import conventions
    pub import: ImportConfig,

    /// Display settings
    pub display: DisplayConfig,
}

impl Config {
    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "outline", "outline").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads configuration from an explicit path or the default location
    ///
    /// An explicit path must exist; a missing default file means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let config_path = match Self::global_config_dir() {
            Some(dir) => dir.join("config.toml"),
            None => return Ok(Self::default()),
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::from_file(&config_path)
    }

    /// Loads configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Failed to load config: {}", path.display()))
    }

    /// Parses and validates TOML content
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that would make imports meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        let hours = self.import.hours_per_day;
        if !hours.is_finite() || hours <= 0.0 || hours > 24.0 {
            return Err(ConfigError::Invalid(format!(
                "import.hours_per_day must be in (0, 24], got {}",
                hours
            )));
        }

        if self.import.placeholder_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "import.placeholder_name must not be blank".to_string(),
            ));
        }

        Ok(())
    }

    /// Renders the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
