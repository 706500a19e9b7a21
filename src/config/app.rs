//! Application configuration loading from abonementus.toml
//!
//! This module provides functionality to load application settings (database
//! location, export directory for backups) from a TOML configuration file,
//! with environment variables taking precedence over file values.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration structure representing the entire abonementus.toml file
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// SeaORM connection string for the `SQLite` database
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Directory where dated database exports are written
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

fn default_database_url() -> String {
    super::database::get_database_url()
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("exports")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            export_dir: default_export_dir(),
        }
    }
}

/// Loads application configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML syntax is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config file: {e}"),
    })
}

/// Loads configuration from the default location (./abonementus.toml),
/// falling back to defaults when the file is absent.
#[must_use]
pub fn load_default_config() -> AppConfig {
    let mut config = load_config("abonementus.toml").unwrap_or_default();
    apply_env_overrides(&mut config);
    config
}

fn apply_env_overrides(config: &mut AppConfig) {
    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database_url = url;
    }
    if let Ok(dir) = std::env::var("EXPORT_DIR") {
        config.export_dir = PathBuf::from(dir);
    }
}
