// src/config/validate.rs

use std::collections::HashSet;

use crate::config::model::ConfigFile;
use crate::errors::{LauncherError, Result};

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - there is at least one server
/// - server names are non-empty and unique
/// - start commands are non-empty
///
/// It does **not**:
/// - check that working directories exist (a missing directory surfaces as a
///   spawn failure for that one server, per the error taxonomy)
/// - tokenize or otherwise validate `startCommand` contents
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    ensure_has_servers(cfg)?;
    validate_server_names(cfg)?;
    validate_start_commands(cfg)?;
    Ok(())
}

fn ensure_has_servers(cfg: &ConfigFile) -> Result<()> {
    if cfg.servers.is_empty() {
        return Err(LauncherError::ConfigError(
            "config must contain at least one entry in \"servers\"".to_string(),
        ));
    }
    Ok(())
}

fn validate_server_names(cfg: &ConfigFile) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::new();

    for server in cfg.servers.iter() {
        if server.name.trim().is_empty() {
            return Err(LauncherError::ConfigError(
                "server with empty name in \"servers\"".to_string(),
            ));
        }
        if !seen.insert(server.name.as_str()) {
            return Err(LauncherError::ConfigError(format!(
                "duplicate server name '{}'",
                server.name
            )));
        }
    }
    Ok(())
}

fn validate_start_commands(cfg: &ConfigFile) -> Result<()> {
    for server in cfg.servers.iter() {
        if server.start_command.trim().is_empty() {
            return Err(LauncherError::ConfigError(format!(
                "server '{}' has an empty startCommand",
                server.name
            )));
        }
    }
    Ok(())
}
