// tests/supervisor_quit.rs

//! End-to-end shutdown test against the built binary.
//!
//! Uses `sh`-style paths and pipes, so Unix-only.

#![cfg(unix)]

use std::error::Error;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn quit_exits_the_supervisor_while_stdin_stays_open() -> TestResult {
    let dir = tempfile::tempdir()?;
    let log_dir = dir.path().join("logs");

    let config_path = dir.path().join("servers.json");
    let config = format!(
        r#"{{
  "logDirectory": {log_dir:?},
  "staggerSecs": 0,
  "servers": [
    {{
      "name": "idle",
      "workingDirectory": ".",
      "startCommand": "true",
      "autorun": false
    }}
  ]
}}"#
    );
    std::fs::write(&config_path, config)?;

    let mut supervisor = Command::new(env!("CARGO_BIN_EXE_multiserv"))
        .arg("--config")
        .arg(&config_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()?;

    let mut stdin = supervisor.stdin.take().expect("stdin pipe");
    stdin.write_all(b"quit\n").await?;
    stdin.flush().await?;

    // Keep the pipe open: shutdown must not depend on the operator's input
    // reaching end-of-stream.
    let status = tokio::time::timeout(Duration::from_secs(10), supervisor.wait()).await??;
    assert!(status.success());

    drop(stdin);
    Ok(())
}
