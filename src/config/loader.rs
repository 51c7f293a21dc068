// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::ConfigFile;
use crate::config::validate::validate_config;
use crate::errors::{LauncherError, Result};

/// Load a configuration file from a given path and return the raw `ConfigFile`.
///
/// This only performs JSON deserialization; it does **not** perform semantic
/// validation (name uniqueness, etc.). Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|err| {
        LauncherError::ConfigError(format!("reading config file at {:?}: {}", path, err))
    })?;

    let config: ConfigFile = serde_json::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run basic validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads JSON.
/// - Applies defaults (handled by `serde` defaults, e.g. `autorun = true`).
/// - Checks for:
///   - at least one server,
///   - non-empty names and start commands,
///   - duplicate server names.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let config = load_from_path(&path)?;
    validate_config(&config)?;
    Ok(config)
}

/// Helper to resolve a default config path.
///
/// Currently this just returns `servers.json` in the current working
/// directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("servers.json")
}
