//! Configuration module for EventPlay-RS
//!
//! Engine tunables are kept in a single TOML file. Every key is optional;
//! missing keys take their defaults.
//!
//! # Config Location
//!
//! - **Linux**: `~/.local/share/dev.eventplay.eventplay-rs/config.toml`
//! - **macOS**: `~/Library/Application Support/dev.eventplay.eventplay-rs/config.toml`
//! - **Windows**: `%APPDATA%\dev.eventplay.eventplay-rs\config.toml`
//!
//! # Example
//!
//! ```toml
//! [recorder]
//! move_throttle_ms = 20
//! excluded_keys = ["f9", "f10", "escape"]
//!
//! [player]
//! stop_timeout_ms = 1000
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{EventPlayError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for data directories
pub const APP_ID: &str = "dev.eventplay.eventplay-rs";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        EventPlayError::Config("Could not determine app data directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            EventPlayError::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Get the path to the default config file
pub fn config_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(CONFIG_FILE))
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Recorder tunables
    pub recorder: RecorderSettings,

    /// Player tunables
    pub player: PlayerSettings,
}

impl EngineConfig {
    /// Parse TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)
            .map_err(|e| EventPlayError::Config(format!("Failed to parse config: {}", e)))?;
        config.normalize();
        Ok(config)
    }

    /// Render as TOML text
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| EventPlayError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            EventPlayError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from the default location; a missing file yields defaults
    pub fn load_default_location() -> Result<Self> {
        let path = config_path().ok_or_else(|| {
            EventPlayError::Config("Could not determine config path".to_string())
        })?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load(path)
    }

    /// Load from the default location, returning defaults on any error
    pub fn load_or_default() -> Self {
        Self::load_default_location().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save to a file, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                EventPlayError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| {
            EventPlayError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }

    /// Save to the default location and return the path written
    pub fn save_default_location(&self) -> Result<PathBuf> {
        let path = ensure_app_data_dir()?.join(CONFIG_FILE);
        self.save(&path)?;
        Ok(path)
    }

    /// Apply clamping and case rules
    pub fn normalize(&mut self) {
        self.recorder.normalize();
        self.player.normalize();
    }
}
