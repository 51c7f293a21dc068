// src/control/dispatcher.rs

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::model::{ConfigFile, ServerConfig};
use crate::registry::ServerRegistry;

/// Parses one line of operator input and executes it against the registry,
/// the launcher channel, and per-server input sinks.
///
/// Every outcome, including operator mistakes (unknown server, malformed
/// arguments), is a plain response string. `dispatch` never returns an error
/// and never panics on bad input.
pub struct CommandDispatcher {
    config: Arc<ConfigFile>,
    registry: ServerRegistry,
    launch_tx: mpsc::Sender<ServerConfig>,
    shutdown: CancellationToken,
}

impl CommandDispatcher {
    pub fn new(
        config: Arc<ConfigFile>,
        registry: ServerRegistry,
        launch_tx: mpsc::Sender<ServerConfig>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config,
            registry,
            launch_tx,
            shutdown,
        }
    }

    /// Handle one raw input line and produce the response text.
    ///
    /// The verb (everything before the first space) is case-insensitive; the
    /// remainder is passed to the individual command as a single argument
    /// string, which commands split further as needed.
    pub async fn dispatch(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return "invalid command".to_string();
        }

        let (verb, arg) = match trimmed.split_once(' ') {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (trimmed, ""),
        };

        debug!(verb = %verb, arg = %arg, "dispatching command");

        match verb.to_lowercase().as_str() {
            "help" => Self::help_text(),
            "list" => self.list(),
            "start" => self.start(arg).await,
            "send" => self.send(arg).await,
            "broadcast" => self.broadcast(arg).await,
            "status" => self.status(arg),
            "quit" | "exit" => self.quit(),
            other => format!("unknown command: {other} - type 'help' for usage"),
        }
    }

    fn help_text() -> String {
        [
            "available commands:",
            "  list - list all servers",
            "  start <server> - start the given server",
            "  send <server> <command> - send a command to the given server",
            "  broadcast <command> - send a command to all running servers",
            "  status <server> - show whether the given server is running",
            "  quit/exit - shut down all servers and exit",
        ]
        .join("\n")
    }

    /// One line per *configured* server, with its live state from the
    /// registry and its configured autorun flag.
    fn list(&self) -> String {
        let mut out = vec!["servers:".to_string()];
        for server in &self.config.servers {
            let state = if self.registry.contains_alive(&server.name) {
                "running"
            } else {
                "stopped"
            };
            out.push(format!(
                " - {} ({}, autorun={})",
                server.name, state, server.autorun
            ));
        }
        out.join("\n")
    }

    /// Hand the definition to the launcher channel and return immediately;
    /// the response does not wait for the spawn to complete.
    async fn start(&self, arg: &str) -> String {
        let name = arg.trim();
        if name.is_empty() {
            return "usage: start <server>".to_string();
        }

        let Some(server) = self.config.server(name) else {
            return format!("error: server '{name}' does not exist");
        };

        // At most one live process per name: an alive entry always wins.
        if self.registry.contains_alive(name) {
            return format!("error: server '{name}' is already running");
        }

        if self.launch_tx.send(server.clone()).await.is_err() {
            return format!("error: failed to start server '{name}': launcher is not running");
        }

        format!("starting server: {name}")
    }

    async fn send(&self, arg: &str) -> String {
        let Some((name, command)) = arg.split_once(' ') else {
            return "usage: send <server> <command>".to_string();
        };

        let Some(entry) = self.registry.get(name) else {
            return format!("error: server '{name}' does not exist or is not running");
        };

        match entry.input.send_line(command).await {
            Ok(()) => format!("sent command to server '{name}': {command}"),
            Err(err) => {
                format!("error: failed to send command to server '{name}': {err}")
            }
        }
    }

    /// Write the command to every registered input sink. A failure on one
    /// sink is logged and does not abort the others; the response reports how
    /// many servers were successfully written to.
    async fn broadcast(&self, arg: &str) -> String {
        let command = arg.trim();
        if command.is_empty() {
            return "usage: broadcast <command>".to_string();
        }

        let mut sent = 0usize;
        for (name, sink) in self.registry.input_sinks() {
            match sink.send_line(command).await {
                Ok(()) => sent += 1,
                Err(err) => {
                    warn!(server = %name, error = %err, "failed to broadcast command");
                }
            }
        }

        format!("broadcast command to {sent} servers: {command}")
    }

    fn status(&self, arg: &str) -> String {
        let name = arg.trim();
        if name.is_empty() {
            return "usage: status <server>".to_string();
        }

        match self.registry.get(name) {
            None => format!("error: server '{name}' does not exist or is not running"),
            Some(entry) => {
                let state = if entry.handle.is_alive() {
                    "running"
                } else {
                    "stopped"
                };
                format!("server '{name}' status: {state}")
            }
        }
    }

    /// Cancel the shared shutdown token. The caller layers react: the control
    /// loop drains, and the supervisor terminates all tracked processes.
    fn quit(&self) -> String {
        self.shutdown.cancel();
        "shutting down all servers...".to_string()
    }
}
