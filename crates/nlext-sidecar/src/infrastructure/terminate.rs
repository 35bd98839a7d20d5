//! Self-termination.
//!
//! When the host closes the window or the app, it already considers the
//! session over.  The sidecar then kills its own process: no drain, no
//! flush, no close handshake.

use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::{error, info};

/// Ends the current process.
///
/// The dispatch loop and the interrupt monitor call this on a close request.
/// Tests substitute a recording implementation.
#[cfg_attr(test, mockall::automock)]
pub trait Terminator: Send + Sync {
    /// Requests termination.  The production implementation does not return
    /// if the kill signal is delivered.
    fn terminate(&self);
}

/// [`Terminator`] that sends a kill signal to the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessTerminator;

impl ProcessTerminator {
    pub fn new() -> Self {
        Self
    }
}

impl Terminator for ProcessTerminator {
    fn terminate(&self) {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => pid,
            Err(e) => {
                error!("cannot determine own PID: {e}");
                return;
            }
        };

        info!("killing own process with PID {pid}");

        let sys = snapshot_process(pid);

        match sys.process(pid) {
            Some(process) => {
                if !process.kill() {
                    error!("failed to send kill signal to PID {pid}");
                }
            }
            None => error!("own process {pid} not found in process table"),
        }
    }
}

/// Process table holding only `pid`, refreshed once.
fn snapshot_process(pid: Pid) -> System {
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    sys
}

// ── Tests ─────────────────────────────────────────────────────────────────────
