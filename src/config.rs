//! Settings file support for polymask.
//!
//! Settings are read from a JSON file (`setting.json`). The upper-case keys
//! written by earlier versions of the tool (`WHEEL_SENSITIVITY`,
//! `MOUSE_SENSITIVITY`, `label`) are accepted alongside the snake-case names.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::files::{DEFAULT_WORKSPACE_DIR, SETTINGS_FILE_NAME};
use crate::constants::viewport::{DEFAULT_PAN_SENSITIVITY, DEFAULT_WHEEL_SENSITIVITY};
use crate::viewport::ViewportConfig;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Ratio change per wheel notch
    #[serde(
        rename = "WHEEL_SENSITIVITY",
        alias = "wheel_sensitivity",
        default = "default_wheel_sensitivity"
    )]
    pub wheel_sensitivity: f32,

    /// Image pixels per dragged widget pixel
    #[serde(
        rename = "MOUSE_SENSITIVITY",
        alias = "pan_sensitivity",
        default = "default_pan_sensitivity"
    )]
    pub pan_sensitivity: f32,

    /// Labels offered when committing a mask; the first is the default
    #[serde(rename = "label", alias = "labels", default = "default_labels")]
    pub labels: Vec<String>,

    /// Directory holding mask files
    #[serde(default = "default_workspace_dir")]
    pub workspace_dir: PathBuf,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_wheel_sensitivity() -> f32 {
    DEFAULT_WHEEL_SENSITIVITY
}

fn default_pan_sensitivity() -> f32 {
    DEFAULT_PAN_SENSITIVITY
}

fn default_labels() -> Vec<String> {
    vec!["object".to_string()]
}

fn default_workspace_dir() -> PathBuf {
    PathBuf::from(DEFAULT_WORKSPACE_DIR)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            wheel_sensitivity: default_wheel_sensitivity(),
            pan_sensitivity: default_pan_sensitivity(),
            labels: default_labels(),
            workspace_dir: default_workspace_dir(),
            log_level: LogLevel::default(),
        }
    }
}

impl AppConfig {
    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(json)?;
        if config.labels.is_empty() {
            log::warn!("Settings list no labels, using defaults");
            config.labels = default_labels();
        }
        Ok(config)
    }

    /// Sensitivities handed to the viewport at construction.
    pub fn viewport_config(&self) -> ViewportConfig {
        ViewportConfig {
            wheel_sensitivity: self.wheel_sensitivity,
            pan_sensitivity: self.pan_sensitivity,
        }
    }

    /// Label preselected for new masks.
    pub fn default_label(&self) -> &str {
        self.labels.first().map_or("object", String::as_str)
    }

    /// Places searched for a settings file, in order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![Path::new(DEFAULT_WORKSPACE_DIR).join(SETTINGS_FILE_NAME)];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("polymask").join(SETTINGS_FILE_NAME));
        }
        paths
    }

    /// Read settings from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded settings from {:?}", path);
        Ok(config)
    }

    /// Load from `explicit` if given, otherwise from the first search path
    /// that exists. Falls back to defaults when no file is found.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::search_paths().into_iter().find(|p| p.exists()) {
            Some(path) => Self::load(path),
            None => {
                log::warn!(
                    "No {} found, using default settings",
                    SETTINGS_FILE_NAME
                );
                Ok(Self::default())
            }
        }
    }

    /// Save settings to `path`, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse settings: {0}")]
    ParseError(#[from] serde_json::Error),

    /// I/O error when reading/writing settings
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_legacy_keys() {
        let json = r#"{
            "WHEEL_SENSITIVITY": 2.5,
            "MOUSE_SENSITIVITY": 0.5,
            "label": ["healthy", "rust", "blight"]
        }"#;
        let config = AppConfig::from_json(json).unwrap();
        assert_eq!(config.wheel_sensitivity, 2.5);
        assert_eq!(config.pan_sensitivity, 0.5);
        assert_eq!(config.labels, vec!["healthy", "rust", "blight"]);
        assert_eq!(config.default_label(), "healthy");
        assert_eq!(config.workspace_dir, PathBuf::from(DEFAULT_WORKSPACE_DIR));
    }

    #[test]
    fn test_reads_snake_case_aliases() {
        let json = r#"{"wheel_sensitivity": 1.0, "pan_sensitivity": 3.0, "labels": ["a"],
                       "workspace_dir": "/data/masks", "log_level": "debug"}"#;
        let config = AppConfig::from_json(json).unwrap();
        assert_eq!(config.viewport_config().pan_sensitivity, 3.0);
        assert_eq!(config.workspace_dir, PathBuf::from("/data/masks"));
        assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_empty_label_list_falls_back() {
        let config = AppConfig::from_json(r#"{"label": []}"#).unwrap();
        assert_eq!(config.default_label(), "object");
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            AppConfig::from_json("{ nope"),
            Err(ConfigError::ParseError(_))
        ));
        assert!(AppConfig::from_json(r#"{"label": "single"}"#).is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join(format!("polymask-config-{}", std::process::id()));
        let path = dir.join(SETTINGS_FILE_NAME);
        let mut config = AppConfig::default();
        config.labels = vec!["one".into(), "two".into()];
        config.wheel_sensitivity = 7.0;
        config.save(&path).unwrap();

        let loaded = AppConfig::discover(Some(&path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let path = std::env::temp_dir().join("polymask-config-does-not-exist.json");
        assert!(matches!(
            AppConfig::discover(Some(&path)),
            Err(ConfigError::IoError(_))
        ));
    }
}
