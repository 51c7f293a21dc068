// src/lib.rs

pub mod cli;
pub mod config;
pub mod control;
pub mod errors;
pub mod logging;
pub mod process;
pub mod registry;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::{ConfigFile, ServerConfig};
use crate::control::CommandDispatcher;
use crate::registry::ServerRegistry;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the server registry
/// - the launcher loop (shared by autorun and operator `start`)
/// - the interactive control loop
/// - staggered autorun launches
/// - Ctrl-C handling and best-effort shutdown
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let log_dir = PathBuf::from(&cfg.log_directory);
    tokio::fs::create_dir_all(&log_dir)
        .await
        .with_context(|| format!("creating log directory {:?}", log_dir))?;

    let registry = ServerRegistry::new();
    let shutdown = CancellationToken::new();

    // Launcher loop: the single entry point for spawning servers.
    let launch_tx = process::spawn_launcher(registry.clone(), log_dir, shutdown.clone());

    // Ctrl-C takes the same shutdown path as an operator `quit`.
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("received Ctrl+C");
            shutdown.cancel();
        });
    }

    let cfg = Arc::new(cfg);
    let dispatcher = CommandDispatcher::new(
        Arc::clone(&cfg),
        registry.clone(),
        launch_tx.clone(),
        shutdown.clone(),
    );

    // Interactive control loop on the operator's stdin.
    let control = tokio::spawn(control::run_input_loop(dispatcher, shutdown.clone()));

    // Staggered autorun launches run concurrently with the control loop.
    let stagger = Duration::from_secs(cfg.effective_stagger_secs(args.stagger_secs));
    run_autorun_launches(&cfg, &launch_tx, stagger, &shutdown).await;

    // Park until shutdown, then ask every tracked process group to
    // terminate. Best-effort: we do not wait for output to drain or
    // children to exit.
    shutdown.cancelled().await;
    info!("shutting down all servers");
    registry.terminate_all();

    let _ = control.await;

    // The control loop's in-flight stdin read is parked on a blocking worker
    // thread and would keep the runtime alive until the operator presses
    // enter. Exit explicitly rather than waiting for input that may never
    // come.
    info!("supervisor exiting");
    std::process::exit(0)
}

/// Launch every `autorun = true` server in declared order, pausing for the
/// stagger delay between consecutive launches.
///
/// The stagger is a deliberate pacing policy, not a dependency ordering
/// primitive: each launch is fire-and-forget, and the delay only spaces out
/// the spawn storms. Shutdown interrupts the wait.
async fn run_autorun_launches(
    cfg: &ConfigFile,
    launch_tx: &mpsc::Sender<ServerConfig>,
    stagger: Duration,
    shutdown: &CancellationToken,
) {
    for server in &cfg.servers {
        if shutdown.is_cancelled() {
            debug!("shutdown during autorun sequence; stopping launches");
            break;
        }

        if !server.autorun {
            info!(server = %server.name, "skipping autorun (autorun=false)");
            println!("skipping autorun: {} (autorun=false)", server.name);
            continue;
        }

        println!("starting server: {}", server.name);
        if launch_tx.send(server.clone()).await.is_err() {
            warn!(server = %server.name, "launcher is not running; stopping autorun");
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(stagger) => {}
            _ = shutdown.cancelled() => {
                debug!("stagger wait interrupted by shutdown");
                break;
            }
        }
    }
}

/// Simple dry-run output: print the configured servers without launching.
fn print_dry_run(cfg: &ConfigFile) {
    println!("multiserv dry-run");
    println!("  logDirectory = {}", cfg.log_directory);
    println!("  staggerSecs = {}", cfg.stagger_secs);
    println!();

    println!("servers ({}):", cfg.servers.len());
    for server in &cfg.servers {
        println!("  - {}", server.name);
        println!("      workingDirectory: {}", server.working_directory);
        println!("      startCommand: {}", server.start_command);
        println!("      autorun: {}", server.autorun);
    }

    debug!("dry-run complete (no execution)");
}
