// src/config/mod.rs

//! Configuration loading and validation for multiserv.
//!
//! Responsibilities:
//! - Define the JSON-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants like name uniqueness (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{ConfigFile, ServerConfig, DEFAULT_STAGGER_SECS};
pub use validate::validate_config;
