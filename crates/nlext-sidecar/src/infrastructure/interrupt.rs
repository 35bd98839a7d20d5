//! Ctrl+C monitor for debug builds.
//!
//! When a developer runs the host from a terminal, Ctrl+C should take the
//! sidecar down through the same path as a host close event.  In release
//! builds nothing subscribes to the signal, so the OS default applies.

use std::sync::Arc;

use tracing::{error, info};

use crate::infrastructure::terminate::Terminator;

/// Watches for Ctrl+C and calls `terminator` on each one.
///
/// With `enabled == false` this never subscribes and never completes.
pub async fn run_interrupt_monitor(enabled: bool, terminator: Arc<dyn Terminator>) {
    if !enabled {
        return std::future::pending().await;
    }

    loop {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("interrupted by keyboard interaction");
                terminator.terminate();
            }
            Err(e) => {
                error!("failed to listen for Ctrl+C: {e}");
                return std::future::pending().await;
            }
        }
    }
}
