//! Configuration management for the CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Model artifact used for local predictions when nothing else is given
pub const DEFAULT_MODEL_PATH: &str = "models/linear_regression_model.json";

/// CLI configuration, read from `<config dir>/energy/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server URL for remote predictions
    pub api_url: Option<String>,
    /// Model artifact for local predictions
    pub model_path: Option<PathBuf>,
    /// Expected hex SHA-256 of the model artifact
    pub model_sha256: Option<String>,
}

impl Config {
    /// Load configuration from the user config directory
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }

    /// Model artifact for local predictions
    pub fn model_path(&self) -> PathBuf {
        self.model_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH))
    }

    fn config_path() -> Option<PathBuf> {
        dirs_next::config_dir().map(|dir| dir.join("energy").join("config.json"))
    }
}
