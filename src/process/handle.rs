// src/process/handle.rs

//! Capability traits over a running child process.
//!
//! The registry and the command dispatcher only ever see these traits, never
//! a concrete `tokio::process::Child`. That keeps the runner free to own the
//! child (it needs `&mut` access for `wait`) and lets tests register fully
//! deterministic fakes.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::process::ChildStdin;
use tokio::sync::{Mutex, Notify};

/// View of a running child process shared with the registry.
pub trait ProcessHandle: Send + Sync {
    /// OS process id, if the process has one.
    fn pid(&self) -> Option<u32>;

    /// True while the process has not fully exited.
    fn is_alive(&self) -> bool;

    /// Request termination. Best-effort: returns immediately and does not
    /// wait for the process to exit.
    fn terminate(&self);
}

/// Line-oriented write channel feeding a running server's stdin.
pub trait InputSink: Send + Sync {
    /// Write one line (terminator appended) to the process stdin and flush.
    fn send_line<'a>(
        &'a self,
        line: &'a str,
    ) -> Pin<Box<dyn Future<Output = std::io::Result<()>> + Send + 'a>>;
}

/// Handle over a `tokio::process::Child` owned by the process runner.
///
/// The handle carries only the pieces the registry needs: the pid, an alive
/// flag the runner clears once it observes the process exit, and a kill
/// signal the runner listens on. The runner spawns every child as the leader
/// of its own process group, so `terminate` can signal the group directly;
/// the notify is what tells the runner to stop waiting on the output pipes.
pub struct ChildHandle {
    pid: Option<u32>,
    alive: Arc<AtomicBool>,
    kill: Arc<Notify>,
}

impl ChildHandle {
    pub fn new(pid: Option<u32>) -> Self {
        Self {
            pid,
            alive: Arc::new(AtomicBool::new(true)),
            kill: Arc::new(Notify::new()),
        }
    }

    /// Flag the runner clears once the process has fully exited.
    pub fn alive_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.alive)
    }

    /// Signal the runner selects on to react to termination requests.
    pub fn kill_signal(&self) -> Arc<Notify> {
        Arc::clone(&self.kill)
    }
}

impl ProcessHandle for ChildHandle {
    fn pid(&self) -> Option<u32> {
        self.pid
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn terminate(&self) {
        // Signal the whole process group: startCommands are routinely shell
        // wrappers, and killing only the direct child leaves the real server
        // running with our pipes still open.
        #[cfg(unix)]
        if let Some(pid) = self.pid {
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;
            use tracing::debug;

            if let Err(err) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
                debug!(pid, error = %err, "process group signal failed");
            }
        }

        // `notify_one` stores a permit, so a request issued before the runner
        // reaches its select loop is not lost.
        self.kill.notify_one();
    }
}

/// Production input sink wrapping the child's stdin pipe.
pub struct ChildInputSink {
    stdin: Mutex<ChildStdin>,
}

impl ChildInputSink {
    pub fn new(stdin: ChildStdin) -> Self {
        Self {
            stdin: Mutex::new(stdin),
        }
    }
}

impl InputSink for ChildInputSink {
    fn send_line<'a>(
        &'a self,
        line: &'a str,
    ) -> Pin<Box<dyn Future<Output = std::io::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let mut stdin = self.stdin.lock().await;
            stdin.write_all(line.as_bytes()).await?;
            stdin.write_all(b"\n").await?;
            stdin.flush().await
        })
    }
}
