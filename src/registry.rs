// src/registry.rs

//! Shared registry of running servers.
//!
//! The registry is the single source of truth for "is this server running".
//! Process runner tasks insert an entry right after a successful spawn and
//! remove it only after the output stream has been drained and the process
//! has fully exited; the command dispatcher reads concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::process::handle::{InputSink, ProcessHandle};

/// One running server as seen by the registry: the process handle and the
/// line-oriented channel feeding its stdin.
#[derive(Clone)]
pub struct ServerEntry {
    pub handle: Arc<dyn ProcessHandle>,
    pub input: Arc<dyn InputSink>,
}

/// Thread-safe map from server name to its live entry.
///
/// Cloning is cheap and shares the underlying map. Iteration never escapes
/// the lock; callers that need to walk entries get a snapshot.
#[derive(Clone, Default)]
pub struct ServerRegistry {
    inner: Arc<Mutex<HashMap<String, ServerEntry>>>,
}

impl ServerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the entry for a freshly spawned server.
    pub fn put(&self, name: &str, handle: Arc<dyn ProcessHandle>, input: Arc<dyn InputSink>) {
        let mut map = self.inner.lock().expect("registry mutex poisoned");
        map.insert(name.to_string(), ServerEntry { handle, input });
    }

    /// Remove a server's entry, returning it if present.
    pub fn remove(&self, name: &str) -> Option<ServerEntry> {
        let mut map = self.inner.lock().expect("registry mutex poisoned");
        map.remove(name)
    }

    /// Fetch a snapshot of the entry for `name`.
    pub fn get(&self, name: &str) -> Option<ServerEntry> {
        let map = self.inner.lock().expect("registry mutex poisoned");
        map.get(name).cloned()
    }

    /// True iff an entry exists and its process handle reports alive.
    pub fn contains_alive(&self, name: &str) -> bool {
        let map = self.inner.lock().expect("registry mutex poisoned");
        map.get(name).is_some_and(|entry| entry.handle.is_alive())
    }

    /// Names of all currently registered servers, in no particular order.
    pub fn list_names(&self) -> Vec<String> {
        let map = self.inner.lock().expect("registry mutex poisoned");
        map.keys().cloned().collect()
    }

    /// Snapshot of `(name, input sink)` pairs for broadcast-style writes.
    ///
    /// The snapshot is taken under the lock; the writes happen outside it.
    pub fn input_sinks(&self) -> Vec<(String, Arc<dyn InputSink>)> {
        let map = self.inner.lock().expect("registry mutex poisoned");
        map.iter()
            .map(|(name, entry)| (name.clone(), Arc::clone(&entry.input)))
            .collect()
    }

    /// Request termination of every tracked process.
    ///
    /// Best-effort: issues the requests and returns without waiting for any
    /// process to exit. Entries are removed by their runner tasks as usual.
    pub fn terminate_all(&self) {
        let handles: Vec<(String, Arc<dyn ProcessHandle>)> = {
            let map = self.inner.lock().expect("registry mutex poisoned");
            map.iter()
                .map(|(name, entry)| (name.clone(), Arc::clone(&entry.handle)))
                .collect()
        };

        for (name, handle) in handles {
            if handle.is_alive() {
                debug!(server = %name, "requesting termination");
                handle.terminate();
            }
        }
    }
}
