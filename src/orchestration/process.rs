//! # Process Handles
//!
//! The health monitor only needs to ask whether a worker's process is still
//! alive. Spawning and restarting belong to the supervisor, which hands the
//! monitor a [`ProcessHandle`] for every worker it starts.

use std::fmt;
use std::process::Child;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, warn};

/// Poll spacing used by [`ChildProcess::join`]
const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Capability over an OS process (or anything that behaves like one)
pub trait ProcessHandle: Send + Sync + fmt::Debug {
    /// OS process id, when there is one
    fn pid(&self) -> Option<u32>;

    fn is_alive(&self) -> bool;

    /// Request termination. Does not wait for exit.
    fn terminate(&self);

    /// Wait up to `timeout` for the process to exit; true if it has exited.
    ///
    /// May block the calling thread for the whole `timeout`. From async code
    /// call it inside `tokio::task::spawn_blocking`.
    fn join(&self, timeout: Duration) -> bool;
}

/// [`ProcessHandle`] over a spawned `std::process::Child`
#[derive(Debug)]
pub struct ChildProcess {
    pid: u32,
    child: Mutex<Child>,
}

impl ChildProcess {
    pub fn new(child: Child) -> Self {
        Self {
            pid: child.id(),
            child: Mutex::new(child),
        }
    }

    fn has_exited(&self) -> bool {
        match self.child.lock().try_wait() {
            Ok(Some(_)) => true,
            Ok(None) => false,
            Err(e) => {
                warn!(pid = self.pid, error = %e, "Failed to poll child process status");
                true
            }
        }
    }
}

impl ProcessHandle for ChildProcess {
    fn pid(&self) -> Option<u32> {
        Some(self.pid)
    }

    fn is_alive(&self) -> bool {
        !self.has_exited()
    }

    fn terminate(&self) {
        if let Err(e) = self.child.lock().kill() {
            // Already-exited children report InvalidInput
            debug!(pid = self.pid, error = %e, "Child process kill returned an error");
        }
    }

    /// Polls `try_wait` with `std::thread::sleep` between attempts, so this
    /// blocks the current thread. Not for use directly on a runtime worker.
    fn join(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.has_exited() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(JOIN_POLL_INTERVAL);
        }
    }
}
