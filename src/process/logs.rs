// src/process/logs.rs

//! Per-server, day-bucketed output log files.
//!
//! One file per `(server name, calendar day)`, named `{name}-{YYYY-MM-DD}.log`
//! under the configured log directory. The file is opened append-mode when
//! the process starts and the same handle is reused for the whole run; there
//! is no mid-run rotation across a day boundary. Every captured line is
//! flushed immediately, so a crash never loses output that was already read.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Append-only log file for one server run.
pub struct ServerLogFile {
    file: File,
    path: PathBuf,
}

impl ServerLogFile {
    /// Open today's log file for `name` under `log_dir`, creating it if
    /// missing, appending if it already exists.
    pub async fn open(log_dir: &Path, name: &str) -> std::io::Result<Self> {
        let path = log_dir.join(log_file_name(name, Local::now().date_naive()));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line and flush immediately.
    pub async fn append_line(&mut self, line: &str) -> std::io::Result<()> {
        self.file.write_all(line.as_bytes()).await?;
        self.file.write_all(b"\n").await?;
        self.file.flush().await
    }
}

/// File name for a server's log on a given day: `{name}-{YYYY-MM-DD}.log`.
pub fn log_file_name(name: &str, date: NaiveDate) -> String {
    format!("{}-{}.log", name, date.format("%Y-%m-%d"))
}

/// Format one captured output line: `[{name}] [{HH:mm:ss}] {line}`.
///
/// The same formatted line goes to the console and to the log file.
pub fn format_line(name: &str, line: &str) -> String {
    format!("[{}] [{}] {}", name, Local::now().format("%H:%M:%S"), line)
}

/// Final line written when the process terminates.
///
/// A child killed by a signal has no exit code on Unix; such exits are
/// recorded as `code: -1`, not the shell's `128 + signal` convention (a
/// SIGKILLed server logs `-1`, not `137`).
pub fn format_exit_line(name: &str, code: i32) -> String {
    format!("[{}] server process exited, code: {}", name, code)
}
