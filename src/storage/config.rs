//! Exporter configuration.
//!
//! Settings are read from `export.toml` in the platform config directory.
//! A missing file yields the defaults, which match what iGPSPORT head units
//! expect in a workout file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::export::writer::WriterOptions;

/// Settings for FIT workout export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Manufacturer id written to the file_id message
    pub manufacturer: u16,
    /// File type written to the file_id message
    pub file_type: u8,
    /// Product id written to the file_id message
    pub product: u16,
    /// Serial number written to the file_id message
    pub serial_number: u32,
    /// Sport written to the workout message (2 = cycling)
    pub sport: u8,
    /// Re-emit message definitions before every record
    pub repeat_definitions: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            manufacturer: 0x003C,
            file_type: 0x04,
            product: 65534,
            serial_number: 12345678,
            sport: 2,
            repeat_definitions: false,
        }
    }
}

impl ExportConfig {
    /// Record framing options derived from this config.
    pub fn writer_options(&self) -> WriterOptions {
        WriterOptions {
            repeat_definitions: self.repeat_definitions,
        }
    }
}

/// Get the configuration directory.
pub fn get_config_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "wktfit", "wktfit")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("export.toml")
}

/// Load the export configuration from the default location.
pub fn load_config() -> Result<ExportConfig, ConfigError> {
    load_config_from(&get_config_path())
}

/// Load the export configuration from a file, falling back to defaults if it
/// does not exist.
pub fn load_config_from(path: &Path) -> Result<ExportConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(ExportConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Save the export configuration to the default location.
pub fn save_config(config: &ExportConfig) -> Result<(), ConfigError> {
    save_config_to(config, &get_config_path())
}

/// Save the export configuration to a file.
pub fn save_config_to(config: &ExportConfig, path: &Path) -> Result<(), ConfigError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
