//! Routes frontend commands to the native functions this sidecar provides.
//!
//! ```text
//! runGo {function:"ping"}    → pingResult {"result":"Rust says PONG in reply to '<parameter>'"}
//! runGo {function:"longRun"} → spawned task → 10 × pingResult progress strings, 1 s apart
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use nlext_core::{result_payload, EventMessage};

use crate::application::{EventHandler, EventSender};
use crate::domain::command::{parameter_text, ExtensionCommand};

/// Event name for replies and progress updates.
pub const PING_RESULT_EVENT: &str = "pingResult";

/// Shape of the long-running progress task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongRunSettings {
    /// Number of progress messages.
    pub steps: u32,
    /// Delay after each progress message.
    pub interval: Duration,
}

impl Default for LongRunSettings {
    fn default() -> Self {
        Self {
            steps: 10,
            interval: Duration::from_secs(1),
        }
    }
}

/// [`EventHandler`] that decodes `runGo` requests into [`ExtensionCommand`]s
/// and executes them.
pub struct CommandRouter {
    sender: Arc<dyn EventSender>,
    long_run: LongRunSettings,
}

impl CommandRouter {
    /// Creates a router that replies through `sender`.
    pub fn new(sender: Arc<dyn EventSender>) -> Self {
        Self::with_long_run(sender, LongRunSettings::default())
    }

    /// Creates a router with custom long-run pacing.
    pub fn with_long_run(sender: Arc<dyn EventSender>, long_run: LongRunSettings) -> Self {
        Self { sender, long_run }
    }

    /// Executes one decoded command.
    ///
    /// `Ping` completes before returning.  `LongRun` only spawns its task;
    /// the handle is returned so callers may await it, but the dispatch loop
    /// drops it.
    pub async fn execute(&self, command: ExtensionCommand) -> Option<JoinHandle<()>> {
        match command {
            ExtensionCommand::Ping { parameter } => {
                let reply = format!(
                    "Rust says PONG in reply to '{}'",
                    parameter_text(&parameter)
                );
                self.sender.send(PING_RESULT_EVENT, result_payload(reply)).await;
                None
            }
            ExtensionCommand::LongRun => {
                info!("starting long-running task ({} steps)", self.long_run.steps);
                Some(spawn_long_run(Arc::clone(&self.sender), self.long_run))
            }
        }
    }
}

#[async_trait]
impl EventHandler for CommandRouter {
    async fn on_event(&self, message: EventMessage) {
        match ExtensionCommand::from_event(&message) {
            Ok(Some(command)) => {
                debug!("executing command {}", command.name());
                // Fire-and-forget: the task owns its own sender handle.
                let _ = self.execute(command).await;
            }
            Ok(None) => debug!("ignoring event '{}'", message.event),
            Err(e) => warn!("rejected run request: {e}"),
        }
    }
}

/// Spawns the progress reporter.
///
/// The task sends `settings.steps` messages of the form
/// `"Long running task progress <i> / <steps>"`, sleeping
/// `settings.interval` after each one.  It cannot be cancelled and ends
/// with the process at the latest.
pub fn spawn_long_run(sender: Arc<dyn EventSender>, settings: LongRunSettings) -> JoinHandle<()> {
    tokio::spawn(async move {
        for step in 1..=settings.steps {
            let progress = format!("Long running task progress {step} / {}", settings.steps);
            sender.send_message_string(PING_RESULT_EVENT, &progress).await;
            tokio::time::sleep(settings.interval).await;
        }
        debug!("long-running task finished");
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
