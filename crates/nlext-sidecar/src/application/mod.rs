//! Application layer for nlext-sidecar.
//!
//! The application layer decides *what* happens when the host sends an
//! event, and delegates *how* bytes reach the socket to the infrastructure
//! layer through two traits:
//!
//! - [`EventHandler`] – called by the dispatch loop for every inbound event
//!   that is not a close request.
//! - [`EventSender`] – implemented by the WebSocket client; handlers use it
//!   to push replies and progress updates.
//!
//! Both traits are injected, so the command handlers are unit-testable with
//! recording doubles instead of a live connection.

use async_trait::async_trait;
use serde_json::Value;

use nlext_core::{result_payload, EventMessage};

pub mod router;

pub use router::{spawn_long_run, CommandRouter, LongRunSettings, PING_RESULT_EVENT};

/// Receives decoded inbound events.
///
/// The dispatch loop awaits `on_event` before reading the next frame, so
/// long work must be moved onto its own task.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handles one inbound event.
    async fn on_event(&self, message: EventMessage);
}

/// Sends outbound events to the host.
///
/// Sends are best-effort: failures are logged by the implementation and the
/// event is dropped.
#[async_trait]
pub trait EventSender: Send + Sync {
    /// Sends `event` with an arbitrary JSON payload.
    async fn send(&self, event: &str, data: Value);

    /// Sends `event` with the payload `{"result": text}`.
    async fn send_message_string(&self, event: &str, text: &str) {
        self.send(event, result_payload(text)).await;
    }
}
