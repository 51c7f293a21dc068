// src/errors.rs

//! Crate-wide error types.
//!
//! Operator mistakes on the control channel (unknown server, malformed
//! arguments) are deliberately *not* represented here: the dispatcher answers
//! those with plain response strings and never returns an error.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to spawn server '{name}': {source}")]
    SpawnError {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, LauncherError>;
