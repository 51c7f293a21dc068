// src/process/mod.rs

//! Process execution layer.
//!
//! This module owns the lifecycle of child server processes, using
//! `tokio::process::Command`:
//!
//! - [`runner`] owns the launcher loop and the spawn→register→stream→wait→
//!   deregister sequence for one server.
//! - [`handle`] defines the capability traits (`ProcessHandle`, `InputSink`)
//!   the registry and dispatcher depend on, plus the production impls.
//! - [`logs`] formats and persists captured output per server per day.
//! - [`command_line`] tokenizes `startCommand` strings.

pub mod command_line;
pub mod handle;
pub mod logs;
pub mod runner;

pub use command_line::split_command;
pub use handle::{ChildHandle, ChildInputSink, InputSink, ProcessHandle};
pub use runner::{run_server, spawn_launcher};
