// tests/runner_stream.rs

//! Integration tests driving `run_server` against real child processes.
//!
//! These use `sh`, so they are Unix-only.

#![cfg(unix)]

mod common;

use std::error::Error;
use std::fs;
use std::time::Duration;

use chrono::Local;
use tokio_util::sync::CancellationToken;

use multiserv::config::ServerConfig;
use multiserv::process::logs::log_file_name;
use multiserv::process::run_server;
use multiserv::registry::ServerRegistry;

use common::wait_until;

type TestResult = Result<(), Box<dyn Error>>;

fn server(name: &str, dir: &std::path::Path, command: &str) -> ServerConfig {
    ServerConfig {
        name: name.to_string(),
        working_directory: dir.display().to_string(),
        start_command: command.to_string(),
        autorun: true,
    }
}

fn log_contents(log_dir: &std::path::Path, name: &str) -> std::io::Result<String> {
    let path = log_dir.join(log_file_name(name, Local::now().date_naive()));
    fs::read_to_string(path)
}

#[tokio::test]
async fn output_lines_are_logged_in_order_with_a_final_exit_line() -> TestResult {
    let dir = tempfile::tempdir()?;
    let log_dir = dir.path().join("logs");
    fs::create_dir_all(&log_dir)?;

    let registry = ServerRegistry::new();
    let cfg = server("echoer", dir.path(), "sh -c \"echo one; echo two\"");

    run_server(
        cfg,
        registry.clone(),
        log_dir.clone(),
        CancellationToken::new(),
    )
    .await;

    // Entry removed only after drain + exit.
    assert!(registry.get("echoer").is_none());
    assert!(!registry.contains_alive("echoer"));

    let contents = log_contents(&log_dir, "echoer")?;
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3);

    assert!(lines[0].starts_with("[echoer] ["));
    assert!(lines[0].ends_with(" one"));
    assert!(lines[1].ends_with(" two"));
    assert_eq!(lines[2], "[echoer] server process exited, code: 0");

    Ok(())
}

#[tokio::test]
async fn nonzero_exit_code_is_recorded() -> TestResult {
    let dir = tempfile::tempdir()?;
    let log_dir = dir.path().join("logs");
    fs::create_dir_all(&log_dir)?;

    let registry = ServerRegistry::new();
    let cfg = server("flaky", dir.path(), "sh -c \"exit 3\"");

    run_server(
        cfg,
        registry.clone(),
        log_dir.clone(),
        CancellationToken::new(),
    )
    .await;

    let contents = log_contents(&log_dir, "flaky")?;
    assert!(contents.contains("server process exited, code: 3"));

    Ok(())
}

#[tokio::test]
async fn stderr_is_merged_into_the_same_log() -> TestResult {
    let dir = tempfile::tempdir()?;
    let log_dir = dir.path().join("logs");
    fs::create_dir_all(&log_dir)?;

    let registry = ServerRegistry::new();
    let cfg = server("noisy", dir.path(), "sh -c \"echo out; echo err 1>&2\"");

    run_server(
        cfg,
        registry.clone(),
        log_dir.clone(),
        CancellationToken::new(),
    )
    .await;

    let contents = log_contents(&log_dir, "noisy")?;
    assert!(contents.contains(" out"));
    assert!(contents.contains(" err"));

    Ok(())
}

#[tokio::test]
async fn server_is_registered_while_running_and_accepts_input() -> TestResult {
    let dir = tempfile::tempdir()?;
    let log_dir = dir.path().join("logs");
    fs::create_dir_all(&log_dir)?;

    let registry = ServerRegistry::new();
    let cfg = server(
        "reader",
        dir.path(),
        "sh -c \"read line; echo got-$line\"",
    );

    let task = tokio::spawn(run_server(
        cfg,
        registry.clone(),
        log_dir.clone(),
        CancellationToken::new(),
    ));

    // Registration happens before streaming, so the entry shows up while the
    // process is still blocked on stdin.
    {
        let registry = registry.clone();
        wait_until(move || registry.contains_alive("reader")).await;
    }

    let entry = registry.get("reader").expect("registered entry");
    entry.input.send_line("ping").await?;

    tokio::time::timeout(Duration::from_secs(5), task).await??;

    assert!(registry.get("reader").is_none());
    let contents = log_contents(&log_dir, "reader")?;
    assert!(contents.contains("got-ping"));

    Ok(())
}

#[tokio::test]
async fn terminate_requests_kill_and_the_entry_is_removed_after_exit() -> TestResult {
    let dir = tempfile::tempdir()?;
    let log_dir = dir.path().join("logs");
    fs::create_dir_all(&log_dir)?;

    let registry = ServerRegistry::new();
    let cfg = server("sleeper", dir.path(), "sh -c \"sleep 30\"");

    let task = tokio::spawn(run_server(
        cfg,
        registry.clone(),
        log_dir.clone(),
        CancellationToken::new(),
    ));

    {
        let registry = registry.clone();
        wait_until(move || registry.contains_alive("sleeper")).await;
    }

    registry.get("sleeper").expect("entry").handle.terminate();

    tokio::time::timeout(Duration::from_secs(5), task).await??;

    assert!(!registry.contains_alive("sleeper"));
    let contents = log_contents(&log_dir, "sleeper")?;
    // Killed by signal: no exit code, recorded as -1.
    assert!(contents.contains("server process exited, code: -1"));

    Ok(())
}

#[tokio::test]
async fn terminate_reaches_grandchildren_of_a_shell_wrapper() -> TestResult {
    let dir = tempfile::tempdir()?;
    let log_dir = dir.path().join("logs");
    fs::create_dir_all(&log_dir)?;

    // The startCommand wraps the real process in another shell. The
    // grandchild holds the output pipes, so killing only the direct child
    // would leave the runner draining forever.
    let registry = ServerRegistry::new();
    let cfg = server(
        "wrapped",
        dir.path(),
        "sh -c \"sh -c 'echo up; sleep 30'\"",
    );

    let task = tokio::spawn(run_server(
        cfg,
        registry.clone(),
        log_dir.clone(),
        CancellationToken::new(),
    ));

    {
        let registry = registry.clone();
        wait_until(move || registry.contains_alive("wrapped")).await;
    }

    registry.get("wrapped").expect("entry").handle.terminate();

    tokio::time::timeout(Duration::from_secs(5), task).await??;

    assert!(registry.get("wrapped").is_none());
    let contents = log_contents(&log_dir, "wrapped")?;
    assert!(contents.contains(" up"));
    assert!(contents.contains("server process exited, code: -1"));

    Ok(())
}

#[tokio::test]
async fn exited_process_reports_stopped_while_output_still_drains() -> TestResult {
    let dir = tempfile::tempdir()?;
    let log_dir = dir.path().join("logs");
    fs::create_dir_all(&log_dir)?;

    // The shell exits right away, but its backgrounded grandchild keeps the
    // output pipe open for a couple of seconds. The handle must report the
    // death as soon as it happens, not once the pipe finally closes.
    let registry = ServerRegistry::new();
    let cfg = server(
        "lingering",
        dir.path(),
        "sh -c \"(sleep 2; echo late) & echo ready\"",
    );

    let task = tokio::spawn(run_server(
        cfg,
        registry.clone(),
        log_dir.clone(),
        CancellationToken::new(),
    ));

    {
        let registry = registry.clone();
        wait_until(move || {
            registry
                .get("lingering")
                .is_some_and(|entry| !entry.handle.is_alive())
        })
        .await;
    }

    // Dead process, entry still present: output has not drained yet.
    assert!(!registry.contains_alive("lingering"));
    assert!(registry.get("lingering").is_some());

    tokio::time::timeout(Duration::from_secs(5), task).await??;

    assert!(registry.get("lingering").is_none());
    let contents = log_contents(&log_dir, "lingering")?;
    assert!(contents.contains(" ready"));
    assert!(contents.contains(" late"));
    assert!(contents.contains("server process exited, code: 0"));

    Ok(())
}

#[tokio::test]
async fn supervisor_shutdown_kills_a_running_server() -> TestResult {
    let dir = tempfile::tempdir()?;
    let log_dir = dir.path().join("logs");
    fs::create_dir_all(&log_dir)?;

    let registry = ServerRegistry::new();
    let shutdown = CancellationToken::new();
    let cfg = server("longrun", dir.path(), "sh -c \"sleep 30\"");

    let task = tokio::spawn(run_server(
        cfg,
        registry.clone(),
        log_dir.clone(),
        shutdown.clone(),
    ));

    {
        let registry = registry.clone();
        wait_until(move || registry.contains_alive("longrun")).await;
    }

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(5), task).await??;

    assert!(registry.get("longrun").is_none());

    Ok(())
}

#[tokio::test]
async fn spawn_failure_leaves_no_registry_entry() -> TestResult {
    let dir = tempfile::tempdir()?;
    let log_dir = dir.path().join("logs");
    fs::create_dir_all(&log_dir)?;

    let registry = ServerRegistry::new();
    let mut cfg = server("ghost", dir.path(), "definitely-not-a-real-binary");
    cfg.working_directory = "/definitely/not/a/dir".to_string();

    run_server(
        cfg,
        registry.clone(),
        log_dir.clone(),
        CancellationToken::new(),
    )
    .await;

    assert!(registry.get("ghost").is_none());
    assert!(!registry.contains_alive("ghost"));

    Ok(())
}
