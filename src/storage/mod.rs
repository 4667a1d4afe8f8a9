//! Storage module for configuration.

pub mod config;

pub use config::{ConfigError, ExportConfig};
