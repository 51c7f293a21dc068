// src/process/runner.rs

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::model::ServerConfig;
use crate::errors::{LauncherError, Result};
use crate::process::command_line::split_command;
use crate::process::handle::{ChildHandle, ChildInputSink, InputSink, ProcessHandle};
use crate::process::logs::{self, ServerLogFile};
use crate::registry::ServerRegistry;

/// Spawn the background launcher loop.
///
/// The returned `mpsc::Sender<ServerConfig>` is the single entry point for
/// launching servers: both the autorun sequence and the dispatcher's `start`
/// command send definitions here. Each launch runs in its own Tokio task, so
/// multiple servers stream output in parallel.
pub fn spawn_launcher(
    registry: ServerRegistry,
    log_dir: PathBuf,
    shutdown: CancellationToken,
) -> mpsc::Sender<ServerConfig> {
    let (tx, mut rx) = mpsc::channel::<ServerConfig>(32);

    tokio::spawn(async move {
        info!("launcher loop started");
        while let Some(server) = rx.recv().await {
            let registry = registry.clone();
            let log_dir = log_dir.clone();
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                run_server(server, registry, log_dir, shutdown).await;
            });
        }
        info!("launcher loop finished (channel closed)");
    });

    tx
}

/// Run one server from spawn to exit: open its log file, spawn the process,
/// register it, stream its merged output, wait for termination, deregister.
///
/// Errors never propagate to a caller that could recover them; a failed
/// launch is logged and leaves the registry without an entry for the server.
/// All other servers are unaffected.
pub async fn run_server(
    server: ServerConfig,
    registry: ServerRegistry,
    log_dir: PathBuf,
    shutdown: CancellationToken,
) {
    let name = server.name.clone();
    if let Err(err) = run_server_inner(server, &registry, &log_dir, shutdown).await {
        error!(server = %name, error = %err, "failed to launch server");
    }
}

async fn run_server_inner(
    server: ServerConfig,
    registry: &ServerRegistry,
    log_dir: &std::path::Path,
    shutdown: CancellationToken,
) -> Result<()> {
    let mut log = ServerLogFile::open(log_dir, &server.name).await?;
    debug!(server = %server.name, path = ?log.path(), "opened log file");

    let argv = split_command(&server.start_command);
    let (program, args) = argv.split_first().ok_or_else(|| {
        LauncherError::ConfigError(format!(
            "server '{}' has an empty startCommand",
            server.name
        ))
    })?;

    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(&server.working_directory)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Own process group per server, so termination can reach everything a
    // shell-wrapper startCommand spawns, not just the shell itself.
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = cmd.spawn().map_err(|source| LauncherError::SpawnError {
        name: server.name.clone(),
        source,
    })?;

    let stdin = child.stdin.take();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let handle = Arc::new(ChildHandle::new(child.id()));
    let alive = handle.alive_flag();
    let kill = handle.kill_signal();

    let input: Arc<dyn InputSink> = match stdin {
        Some(stdin) => Arc::new(ChildInputSink::new(stdin)),
        None => {
            // Piped stdin should always be present after a successful spawn.
            let _ = child.start_kill();
            return Err(LauncherError::ConfigError(format!(
                "no stdin pipe for server '{}'",
                server.name
            )));
        }
    };

    // Register before streaming begins so concurrent status/send commands
    // observe the new server immediately.
    registry.put(&server.name, Arc::clone(&handle) as Arc<dyn ProcessHandle>, input);

    info!(server = %server.name, pid = ?handle.pid(), "server process spawned");
    println!("[{}] server started", server.name);

    // Merge stdout and stderr into a single line channel. Per-stream order is
    // preserved; one consumer loop per server keeps echo and log in the exact
    // order lines arrive.
    let (line_tx, mut line_rx) = mpsc::channel::<String>(64);
    if let Some(stdout) = stdout {
        spawn_line_forwarder(&server.name, "stdout", stdout, line_tx.clone());
    }
    if let Some(stderr) = stderr {
        spawn_line_forwarder(&server.name, "stderr", stderr, line_tx.clone());
    }
    drop(line_tx);

    // Stream until end-of-stream. A termination request (registry handle) or
    // supervisor shutdown asks the child's process group to die; we keep
    // draining until the pipes close so no already-emitted output is lost.
    // Exit is observed by polling so the alive flag turns false as soon as
    // the process dies, not only once the pipes reach end-of-stream.
    let mut kill_requested = false;
    let mut exit_status: Option<ExitStatus> = None;
    let mut reap = tokio::time::interval(Duration::from_millis(100));
    loop {
        tokio::select! {
            line = line_rx.recv() => match line {
                Some(line) => {
                    let formatted = logs::format_line(&server.name, &line);
                    println!("{formatted}");
                    if let Err(err) = log.append_line(&formatted).await {
                        warn!(server = %server.name, error = %err, "failed to append to log file");
                    }
                }
                None => break,
            },
            _ = reap.tick(), if exit_status.is_none() => {
                match child.try_wait() {
                    Ok(Some(status)) => {
                        alive.store(false, Ordering::SeqCst);
                        exit_status = Some(status);
                        if kill_requested {
                            // A leftover grandchild could hold the pipes open
                            // forever; after a kill we stop at reap instead
                            // of waiting for end-of-stream.
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(err) => {
                        warn!(server = %server.name, error = %err, "failed polling server process");
                    }
                }
            }
            _ = kill.notified(), if !kill_requested && exit_status.is_none() => {
                info!(server = %server.name, "termination requested");
                kill_requested = true;
                if let Err(err) = child.start_kill() {
                    warn!(server = %server.name, error = %err, "failed to kill server process");
                }
            }
            _ = shutdown.cancelled(), if !kill_requested && exit_status.is_none() => {
                info!(server = %server.name, "supervisor shutting down, killing server");
                kill_requested = true;
                // The handle signals the whole process group on Unix.
                handle.terminate();
                if let Err(err) = child.start_kill() {
                    warn!(server = %server.name, error = %err, "failed to kill server process");
                }
            }
        }
    }

    let code = match exit_status {
        Some(status) => status.code().unwrap_or(-1),
        None => match child.wait().await {
            Ok(status) => status.code().unwrap_or(-1),
            Err(err) => {
                warn!(server = %server.name, error = %err, "failed waiting for server process");
                -1
            }
        },
    };

    let exit_line = logs::format_exit_line(&server.name, code);
    println!("{exit_line}");
    if let Err(err) = log.append_line(&exit_line).await {
        warn!(server = %server.name, error = %err, "failed to append exit line to log file");
    }

    // The alive flag already flipped when the exit was observed; dropping the
    // registry entry waits until here, after the output is drained and the
    // exit line is recorded.
    alive.store(false, Ordering::SeqCst);
    registry.remove(&server.name);

    info!(server = %server.name, exit_code = code, "server process exited");
    Ok(())
}

/// Forward lines from one output pipe into the merged line channel.
fn spawn_line_forwarder<R>(
    name: &str,
    stream: &'static str,
    reader: R,
    tx: mpsc::Sender<String>,
) where
    R: AsyncRead + Unpin + Send + 'static,
{
    let name = name.to_string();
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).await.is_err() {
                break;
            }
        }
        debug!(server = %name, stream, "output stream ended");
    });
}
