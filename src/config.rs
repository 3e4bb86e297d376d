//! # Generator Settings
//!
//! Settings for the generator itself: where the document goes, how it is
//! encoded, and how loud the log is. These never change generated values.
//!
//! ## Example: TOML Settings
//!
//! ```toml
//! [output]
//! path = "/etc/redeem/default.cfg"
//! format = "cfg"
//!
//! [logging]
//! level = "debug"
//!
//! [revisions]
//! fallback_main = "0B3A"
//! ```

// src/config.rs - Generator settings file
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Top-level generator settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub revisions: RevisionSettings,
}

/// Encoding of the persisted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// ConfigObj-style INI, the runtime's native format
    #[default]
    Cfg,
    Toml,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputSettings {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            format: OutputFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingSettings {
    /// Map the configured level name onto a tracing level, falling back to INFO.
    pub fn tracing_level(&self) -> tracing::Level {
        self.level
            .parse::<tracing::Level>()
            .unwrap_or(tracing::Level::INFO)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RevisionSettings {
    /// Main board revision assumed when none is detected.
    #[serde(default = "default_fallback_main")]
    pub fallback_main: String,
}

impl Default for RevisionSettings {
    fn default() -> Self {
        Self {
            fallback_main: default_fallback_main(),
        }
    }
}

// Default value functions
fn default_output_path() -> PathBuf { PathBuf::from("default.cfg") }
fn default_log_level() -> String { "info".to_string() }
fn default_fallback_main() -> String { crate::board::FALLBACK_MAIN_REVISION.to_string() }

/// Load generator settings from a TOML file at the given path.
pub fn load_settings(path: &str) -> Result<Settings, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                tracing::error!("Failed to parse settings TOML: {}", e);
                Err(ConfigError::Toml(e))
            }
        },
        Err(e) => {
            tracing::error!("Failed to read settings file '{}': {}", path, e);
            Err(ConfigError::Io(e))
        }
    }
}
