//! Configuration management.
//!
//! Settings live in `<config dir>/stepslice/config.toml`. A missing file
//! means defaults, and every section and field may be omitted.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::segment::SegmentationConfig;

/// Name of the directory under the platform config dir.
const APP_DIR: &str = "stepslice";

/// Name of the configuration file.
const CONFIG_FILE: &str = "config.toml";

/// Default directory for written artifacts, relative to the working dir.
pub const DEFAULT_OUTPUT_DIR: &str = "segments";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub segmentation: SegmentationConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

/// How raw logs are read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Replace invalid UTF-8 instead of skipping the job
    pub lossy_utf8: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { lossy_utf8: true }
    }
}

/// Where and how artifacts are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub pretty_json: bool,
    /// Keep step text inside the JSON records
    pub inline_logs: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_OUTPUT_DIR),
            pretty_json: true,
            inline_logs: false,
        }
    }
}

impl Config {
    /// Path of the user configuration file.
    pub fn config_path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("Could not determine config directory")?;
        Ok(base.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load the user configuration, falling back to defaults.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Write this configuration to the user config file.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}
