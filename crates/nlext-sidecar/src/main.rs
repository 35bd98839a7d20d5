//! nlext sidecar entry point.
//!
//! The desktop shell spawns this binary as an extension process, writes one
//! JSON object with connection parameters to its stdin, and expects it to
//! connect back over WebSocket.
//!
//! # What happens at startup
//!
//! 1. `tracing_subscriber` is initialised.  `RUST_LOG` overrides the default
//!    filter (`debug` in debug builds, `warn` in release builds).
//! 2. The startup object is read from stdin on a blocking thread.
//! 3. The single WebSocket connection is opened.  Failure is fatal: the
//!    process logs the error and exits non-zero.
//! 4. The dispatch loop is spawned; the main task watches for Ctrl+C (debug
//!    builds only) until the loop ends.
//! 5. The connection is closed and the process exits.
//!
//! Close events from the host (`windowClose`, `appClose`) kill the process
//! directly and never reach step 5.
//!
//! There are no command-line flags.

use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use nlext_sidecar::application::{CommandRouter, EventHandler, EventSender};
use nlext_sidecar::domain::SidecarOptions;
use nlext_sidecar::infrastructure::{
    load_config_from_stdin, run_interrupt_monitor, spawn_dispatch_loop, DispatchExit,
    ExtensionClient, ProcessTerminator, Terminator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = SidecarOptions::default();

    // ── Logging setup ─────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(options.default_log_filter())),
        )
        .init();

    info!("nlext sidecar {} starting", nlext_core::VERSION);

    // ── Startup configuration ─────────────────────────────────────────────────
    let config = tokio::task::spawn_blocking(load_config_from_stdin)
        .await
        .context("startup configuration reader panicked")?;

    // ── Connect ───────────────────────────────────────────────────────────────
    let (client, frames) = match ExtensionClient::connect(&config, &options).await {
        Ok(pair) => pair,
        Err(e) => {
            error!("cannot reach host: {e}");
            return Err(e).context("failed to connect to host");
        }
    };

    // ── Dispatch ──────────────────────────────────────────────────────────────
    let terminator: Arc<dyn Terminator> = Arc::new(ProcessTerminator::new());
    let sender: Arc<dyn EventSender> = Arc::new(client.clone());
    let handler: Arc<dyn EventHandler> = Arc::new(CommandRouter::new(sender));

    let dispatch = spawn_dispatch_loop(frames, handler, Arc::clone(&terminator), options.clone());

    let exit = tokio::select! {
        result = dispatch => result.context("dispatch loop panicked")?,
        () = run_interrupt_monitor(options.debug, terminator) => DispatchExit::Closed,
    };

    match exit {
        DispatchExit::Closed => info!("host closed the connection"),
        DispatchExit::ReadErrors(n) => warn!("connection unusable after {n} read errors"),
    }

    // ── Shutdown ──────────────────────────────────────────────────────────────
    if let Err(e) = client.close().await {
        debug!("close: {e}");
    }

    info!("nlext sidecar stopped");
    Ok(())
}
