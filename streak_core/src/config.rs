//! Configuration file support for Streakline.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/streakline/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub trend: TrendConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// How the consistency vote's thresholds apply to windows other than a week
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyScaling {
    /// Thresholds are 6/7 and 4/7 of the window length
    #[default]
    Proportional,
    /// Thresholds are 6 and 4 active days whatever the window length
    Fixed,
}

/// Trend classification parameters
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrendConfig {
    /// Length in days of each comparison window
    #[serde(default = "default_window_days")]
    pub window_days: u32,

    /// Percent change in average calories that counts as a real move
    #[serde(default = "default_calorie_change_percent")]
    pub calorie_change_percent: f64,

    /// Sessions needed before the intensity vote leaves "maintaining"
    #[serde(default = "default_min_intensity_sessions")]
    pub min_intensity_sessions: usize,

    /// Most recent sessions the intensity vote looks at
    #[serde(default = "default_recent_sessions")]
    pub recent_sessions: usize,

    #[serde(default)]
    pub consistency_scaling: ConsistencyScaling,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            calorie_change_percent: default_calorie_change_percent(),
            min_intensity_sessions: default_min_intensity_sessions(),
            recent_sessions: default_recent_sessions(),
            consistency_scaling: ConsistencyScaling::default(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("streakline")
}

fn default_window_days() -> u32 {
    7
}

fn default_calorie_change_percent() -> f64 {
    10.0
}

fn default_min_intensity_sessions() -> usize {
    4
}

fn default_recent_sessions() -> usize {
    20
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(config_path) if config_path.exists() => Self::load_from(&config_path),
            Some(config_path) => {
                tracing::info!("No config file found at {:?}, using defaults", config_path);
                Ok(Self::default())
            }
            None => {
                tracing::info!("No config directory available, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .map(|base| base.join("streakline").join("config.toml"))
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
