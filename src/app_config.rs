use anyhow::{anyhow, Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::sync_scanner::DEFAULT_CLASS_MARKER;

/// Application configuration module
/// This module handles loading, validating and saving the settings
/// of the sync tool.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Subtitle scanning options
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Output file options
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Options for locating subtitle lines
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScannerConfig {
    // @field: Class marker a line must contain to be searchable (case-insensitive)
    #[serde(default = "default_class_marker")]
    pub class_marker: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            class_marker: default_class_marker(),
        }
    }
}

/// Options for writing adjusted files
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OutputConfig {
    // @field: Inserted before the extension when no destination is given
    #[serde(default = "default_output_suffix")]
    pub suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            suffix: default_output_suffix(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_class_marker() -> String {
    DEFAULT_CLASS_MARKER.to_string()
}

fn default_output_suffix() -> String {
    "synced".to_string()
}

impl Config {

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.scanner.class_marker.trim().is_empty() {
            return Err(anyhow!("scanner.class_marker must not be empty"));
        }

        let suffix = &self.output.suffix;
        if suffix.is_empty() {
            return Err(anyhow!("output.suffix must not be empty"));
        }
        if suffix.contains('/') || suffix.contains('\\') {
            return Err(anyhow!("output.suffix must not contain path separators: {}", suffix));
        }

        Ok(())
    }

    /// Read a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .context(format!("Failed to open config file: {:?}", path))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Location of the per-user configuration file, if the platform has one
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("smisync").join("conf.json"))
    }

    /// Load `path`, falling back to the per-user file, and finally to defaults
    /// which are then written to `path`
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            debug!("Loading configuration from {:?}", path);
            return Self::from_file(path);
        }

        if let Some(user_path) = Self::user_config_path().filter(|p| p.exists()) {
            debug!("Loading configuration from {:?}", user_path);
            return Self::from_file(user_path);
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();

        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(path, config_json)
            .context(format!("Failed to write default config to file: {:?}", path))?;

        Ok(config)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            scanner: ScannerConfig::default(),
            output: OutputConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
