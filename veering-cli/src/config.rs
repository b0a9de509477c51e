//! Application configuration (config.toml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use veering_core::CycleConfig;

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub tags: TagsConfig,
    #[serde(default)]
    pub cycle: CycleConfig,
    #[serde(default)]
    pub reader: ReaderConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TagsConfig {
    #[serde(default = "default_tags_file")]
    pub file: PathBuf,
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            file: default_tags_file(),
        }
    }
}

fn default_tags_file() -> PathBuf {
    PathBuf::from("tags.json")
}

/// Serial settings for reader adapters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReaderConfig {
    #[serde(default = "default_device")]
    pub device: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            baud_rate: default_baud_rate(),
        }
    }
}

fn default_device() -> String {
    "/dev/ttyUSB0".to_string()
}

fn default_baud_rate() -> u32 {
    115_200
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifierConfig {
    /// Name of the paired phone, used in log output
    #[serde(default = "default_device_name")]
    pub device_name: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            device_name: default_device_name(),
        }
    }
}

fn default_device_name() -> String {
    "phone_name".to_string()
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .cycle
        .validate()
        .with_context(|| format!("Invalid [cycle] section in {:?}", path))?;

    Ok(config)
}
