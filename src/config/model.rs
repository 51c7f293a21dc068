// src/config/model.rs

use serde::Deserialize;

/// Stagger between consecutive autorun launches when the config does not say
/// otherwise.
pub const DEFAULT_STAGGER_SECS: u64 = 20;

/// Top-level configuration as read from a JSON file.
///
/// Key casing follows the original launcher config format:
///
/// ```json
/// {
///   "logDirectory": "logs",
///   "servers": [
///     {
///       "name": "alpha",
///       "workingDirectory": "/srv/alpha",
///       "startCommand": "java -jar \"my server.jar\" nogui",
///       "autorun": true
///     }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    /// Directory where per-server day-bucketed log files are written.
    ///
    /// Created (including parents) at startup if missing.
    pub log_directory: String,

    /// Delay in seconds between consecutive autorun launches.
    ///
    /// The `--stagger-secs` CLI flag takes precedence when provided.
    #[serde(default = "default_stagger_secs")]
    pub stagger_secs: u64,

    /// All supervised servers, in declared order.
    ///
    /// Declared order is the autorun launch order.
    #[serde(default)]
    pub servers: Vec<ServerConfig>,
}

fn default_stagger_secs() -> u64 {
    DEFAULT_STAGGER_SECS
}

/// One supervised server.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Unique, non-empty identifier used by the control protocol and in log
    /// file names.
    pub name: String,

    /// Working directory the child process is spawned in.
    ///
    /// Not pre-checked; a missing directory surfaces as a spawn failure.
    pub working_directory: String,

    /// Command line used to start the server.
    ///
    /// Double-quoted substrings are kept as single arguments; there is no
    /// escaped-quote or nested-quote handling.
    pub start_command: String,

    /// Whether this server is launched automatically at startup.
    #[serde(default = "default_autorun")]
    pub autorun: bool,
}

fn default_autorun() -> bool {
    true
}

impl ConfigFile {
    /// Look up a server definition by name.
    pub fn server(&self, name: &str) -> Option<&ServerConfig> {
        self.servers.iter().find(|s| s.name == name)
    }

    /// Effective stagger delay, considering a CLI override.
    pub fn effective_stagger_secs(&self, cli_override: Option<u64>) -> u64 {
        cli_override.unwrap_or(self.stagger_secs)
    }
}
