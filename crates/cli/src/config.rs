use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use taskdash_core::dashboard::Variant;

const APP_DIR: &str = "taskdash";
const STATE_FILE: &str = "client-state.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub variant: Variant,
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            variant: Variant::default(),
            data_dir: None,
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (config_path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::config_path()?, false),
        };

        if !config_path.exists() {
            if required {
                anyhow::bail!("Config file not found: {}", config_path.display());
            }
            debug!("No config at {}; using defaults", config_path.display());
            return Ok(Self::default());
        }

        info!("Loading config from {}", config_path.display());
        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Command-line (or environment) values win over the file.
    pub fn with_overrides(mut self, api_url: Option<String>, data_dir: Option<PathBuf>) -> Self {
        if let Some(api_url) = api_url {
            self.api_url = api_url;
        }
        if data_dir.is_some() {
            self.data_dir = data_dir;
        }
        self
    }

    pub fn config_dir() -> Result<PathBuf> {
        let base = dirs::config_dir().context("Failed to get config directory")?;
        Ok(base.join(APP_DIR))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => {
                let base = dirs::data_dir().context("Failed to get data directory")?;
                Ok(base.join(APP_DIR))
            }
        }
    }

    /// File backing the client-side store
    pub fn state_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(STATE_FILE))
    }
}
