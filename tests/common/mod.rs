// tests/common/mod.rs

//! Shared test helpers: deterministic fakes for the process capability
//! traits, and small async utilities.

#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use multiserv::process::handle::{InputSink, ProcessHandle};

/// Fake process handle with a controllable alive flag.
pub struct FakeHandle {
    alive: AtomicBool,
    terminated: AtomicBool,
}

impl FakeHandle {
    pub fn new(alive: bool) -> Arc<Self> {
        Arc::new(Self {
            alive: AtomicBool::new(alive),
            terminated: AtomicBool::new(false),
        })
    }

    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::SeqCst);
    }

    pub fn was_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }
}

impl ProcessHandle for FakeHandle {
    fn pid(&self) -> Option<u32> {
        Some(4242)
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn terminate(&self) {
        self.terminated.store(true, Ordering::SeqCst);
    }
}

/// Fake input sink that records every line, or fails every write.
pub struct FakeSink {
    sent: Mutex<Vec<String>>,
    fail: bool,
}

impl FakeSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn sent_lines(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

impl InputSink for FakeSink {
    fn send_line<'a>(
        &'a self,
        line: &'a str,
    ) -> Pin<Box<dyn Future<Output = std::io::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            if self.fail {
                return Err(std::io::Error::other("sink closed"));
            }
            self.sent.lock().unwrap().push(line.to_string());
            Ok(())
        })
    }
}

/// Poll `cond` until it returns true, up to ~5 seconds.
pub async fn wait_until(cond: impl Fn() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("condition not met within timeout");
}
